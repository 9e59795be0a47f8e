//! sleep — Pause the current stage.

use std::time::Duration;

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

pub struct Sleep;

#[async_trait]
impl Tool for Sleep {
    fn name(&self) -> &str {
        "sleep"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("sleep", "Pause for a number of seconds")
            .param(ParamSchema::required("seconds", "Duration, fractions allowed"))
    }

    async fn execute(&self, args: ToolArgs, _ctx: &mut ExecContext) -> ExecResult {
        let Some(spec) = args.get(0) else {
            return ExecResult::failure(1, "sleep: missing operand");
        };
        match spec.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                tokio::time::sleep(Duration::from_secs_f64(secs)).await;
                ExecResult::success("")
            }
            _ => ExecResult::failure(1, format!("sleep: invalid time interval '{}'", spec)),
        }
    }
}
