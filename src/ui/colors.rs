use colored::Colorize;

// 状态消息一律写 stderr，stdout 只留给文章正文，方便重定向

/// 显示成功消息（绿色 ✓）
pub fn success(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "✓".green().bold(), msg.green());
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// 显示错误消息（红色 ✗）
pub fn error(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "✗".red().bold(), msg.red());
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// 显示警告消息（黄色 ⚠）
pub fn warning(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "⚠".yellow().bold(), msg.yellow());
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// 格式化信息消息（蓝色 ℹ）
pub fn info(msg: &str, colored: bool) -> String {
    if colored {
        format!("{} {}", "ℹ".blue().bold(), msg.blue())
    } else {
        format!("ℹ {}", msg)
    }
}

/// 显示步骤提示（灰色）
pub fn step(step: &str, msg: &str, colored: bool) {
    if colored {
        eprintln!(
            "{} {}",
            format!("[{}]", step).bright_black().bold(),
            msg.bright_black()
        );
    } else {
        eprintln!("[{}] {}", step, msg);
    }
}

/// 标题评分，按分段着色
pub fn score(score: f64, colored: bool) -> String {
    let text = format!("{:>4.1}", score);
    if !colored {
        return text;
    }
    if score >= 9.0 {
        text.green().bold().to_string()
    } else if score >= 7.0 {
        text.yellow().to_string()
    } else {
        text.bright_black().to_string()
    }
}
