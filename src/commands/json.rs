use serde::Serialize;

use crate::error::{ForgeError, Result};

/// JSON 错误输出结构（统一）
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorJson {
    /// 从 ForgeError 创建 ErrorJson
    pub fn from_error(err: &ForgeError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().map(String::from),
        }
    }
}

/// 通用的 JSON 输出结构
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorJson>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 输出成功结果
pub fn output_json<T: Serialize>(data: T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&JsonOutput::ok(data))?);
    Ok(())
}

/// 输出 JSON 格式的错误（通用函数）
///
/// # 示例
/// ```no_run
/// use article_forge::commands::json;
/// use article_forge::error::ForgeError;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// json::output_json_error(&ForgeError::Cancelled)?;
/// # Ok(())
/// # }
/// ```
pub fn output_json_error(err: &ForgeError) -> Result<()> {
    println!("{}", error_envelope(err)?);
    Ok(())
}

fn error_envelope(err: &ForgeError) -> Result<String> {
    let output = JsonOutput::<()> {
        success: false,
        data: None,
        error: Some(ErrorJson::from_error(err)),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}
