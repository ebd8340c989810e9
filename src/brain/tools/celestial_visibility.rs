//! Celestial Visibility Tool
//!
//! Lets the model ask which bodies are up for a location and instant. The
//! computation is CPU bound (event search samples hundreds of positions per
//! body), so it runs on the blocking pool.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use super::error::{Result, ToolError};
use super::r#trait::{Tool, ToolExecutionContext, ToolResult};
use crate::astronomy::{VisibilityCalculator, VisibilityRequest};

pub const TOOL_NAME: &str = "celestial_visibility";

pub struct CelestialVisibilityTool {
    calculator: Arc<VisibilityCalculator>,
}

impl CelestialVisibilityTool {
    pub fn new(calculator: Arc<VisibilityCalculator>) -> Self {
        Self { calculator }
    }
}

#[async_trait]
impl Tool for CelestialVisibilityTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Report which of the Sun, Moon, Mercury, Venus, Mars, Jupiter, Saturn, Uranus and \
         Neptune are above the horizon for an observer. Returns altitude/azimuth, next rise, \
         set and transit times (UTC), magnitude, Moon illumination and phase, and the best \
         dark-sky viewing time for each body, plus a one-line summary."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "minimum": -90,
                    "maximum": 90,
                    "description": "Observer latitude in degrees, north positive"
                },
                "longitude": {
                    "type": "number",
                    "minimum": -180,
                    "maximum": 180,
                    "description": "Observer longitude in degrees, east positive"
                },
                "elevation": {
                    "type": "number",
                    "description": "Height above sea level in meters (default 0)"
                },
                "time": {
                    "type": "string",
                    "format": "date-time",
                    "description": "RFC 3339 instant to evaluate (default: now)"
                }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, input: Value, context: &ToolExecutionContext) -> Result<ToolResult> {
        let request: VisibilityRequest = match serde_json::from_value(input) {
            Ok(r) => r,
            Err(e) => return Ok(ToolResult::error(format!("Invalid arguments: {e}"))),
        };
        let (observer, at) = match request.resolve(Utc::now()) {
            Ok(resolved) => resolved,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        tracing::info!(
            thread = %context.thread_id,
            latitude = observer.latitude,
            longitude = observer.longitude,
            time = %at,
            "Computing celestial visibility"
        );

        let calculator = Arc::clone(&self.calculator);
        let report = tokio::task::spawn_blocking(move || calculator.compute(&observer, at))
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        let report = match report {
            Ok(report) => report,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let output =
            serde_json::to_string(&report).map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(ToolResult::success(output))
    }
}
