//! 流式输出 UI 组件
//!
//! 实时显示生成中的文本（打字机效果），首个 fragment 到达时关闭 spinner。

use std::io::{self, Write};

use colored::Colorize;

use crate::error::{ForgeError, Result};
use crate::llm::{GeneratedArticle, GenerationEvent, GenerationHandle};

use super::Spinner;

/// 流式文本输出器
pub struct StreamingOutput<W: Write = io::Stderr> {
    out: W,
    colored: bool,
    echo: bool,
    received: usize,
}

impl StreamingOutput {
    /// 输出到 stderr；`echo = false` 时只计数不打印
    pub fn new(colored: bool, echo: bool) -> Self {
        Self::with_writer(io::stderr(), colored, echo)
    }
}

impl<W: Write> StreamingOutput<W> {
    pub fn with_writer(out: W, colored: bool, echo: bool) -> Self {
        Self {
            out,
            colored,
            echo,
            received: 0,
        }
    }

    /// Bytes of model output seen so far.
    pub fn received(&self) -> usize {
        self.received
    }

    fn push(&mut self, text: &str) {
        self.received += text.len();
        if !self.echo {
            return;
        }
        let written = if self.colored {
            write!(self.out, "{}", text.bright_black())
        } else {
            write!(self.out, "{}", text)
        };
        if written.is_ok() {
            self.out.flush().ok();
        }
    }

    fn end_line(&mut self) {
        if self.echo && self.received > 0 {
            writeln!(self.out).ok();
        }
    }

    /// 消费事件直到终止事件，返回校验通过的文章
    pub async fn process(
        &mut self,
        handle: &mut GenerationHandle,
        spinner: Option<&Spinner>,
    ) -> Result<GeneratedArticle> {
        while let Some(event) = handle.next_event().await {
            match event {
                GenerationEvent::Fragment(text) => {
                    if self.received == 0
                        && let Some(spinner) = spinner
                    {
                        if self.echo {
                            spinner.finish_and_clear();
                        } else {
                            spinner.append_suffix("(receiving)");
                        }
                    }
                    self.push(&text);
                }
                GenerationEvent::Complete(article) => {
                    self.end_line();
                    return Ok(article);
                }
                GenerationEvent::Error(e) => {
                    self.end_line();
                    return Err(e);
                }
            }
        }
        Err(ForgeError::Cancelled)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
