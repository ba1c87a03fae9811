//! JavaScript execution operations for CDP page session.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate an expression and return its value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        self.run(expression, false).await
    }

    /// Evaluate as if the user had triggered it, so popups and
    /// `window.open` are not blocked.
    pub async fn evaluate_with_gesture(&self, expression: &str) -> Result<Value, CdpError> {
        self.run(expression, true).await
    }

    async fn run(&self, expression: &str, user_gesture: bool) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                    "userGesture": user_gesture,
                })),
            )
            .await?;
        Self::evaluation_value(result)
    }

    /// Unwrap a `Runtime.evaluate` reply.
    pub(crate) fn evaluation_value(mut result: Value) -> Result<Value, CdpError> {
        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(CdpError::JavaScript(text.to_string()));
        }
        Ok(result
            .get_mut("result")
            .and_then(|r| r.get_mut("value"))
            .map(Value::take)
            .unwrap_or(Value::Null))
    }
}
