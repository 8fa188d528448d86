use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{build_prompt, estimate_from_keywords, LlmClient, Macros, ParseError};

/// Relative calorie/macro deviation above which a warning is logged.
const CALORIE_TOLERANCE: f64 = 0.3;

#[derive(Clone)]
pub struct MealParser {
    llm: Option<Arc<dyn LlmClient>>,
}

impl MealParser {
    pub fn new(llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { llm }
    }

    pub fn keyword_only() -> Self {
        Self { llm: None }
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    #[instrument(skip(self))]
    pub async fn parse(&self, text: &str) -> Result<Macros, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::InvalidInput("Text is required".into()));
        }

        let Some(llm) = &self.llm else {
            debug!("no completion endpoint configured; using keyword table");
            return Ok(estimate_from_keywords(text));
        };

        let content = llm.complete(&build_prompt(text)).await?;
        let macros = extract_macros(&content).map_err(|e| {
            error!(error = %e, content = %content, "could not read macros from completion");
            e
        })?;
        check_calorie_consistency(&macros);
        Ok(macros)
    }
}

/// Pulls the brace-delimited JSON object out of `content` and validates it.
pub(crate) fn extract_macros(content: &str) -> Result<Macros, ParseError> {
    lazy_static! {
        static ref JSON_OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }
    let candidate = JSON_OBJECT_RE
        .find(content)
        .map(|m| m.as_str())
        .unwrap_or(content);

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| ParseError::InvalidResponseFormat(e.to_string()))?;

    let field = |name: &str| -> Result<f64, ParseError> {
        let n = value
            .get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                ParseError::InvalidResponseFormat(format!("missing numeric field `{name}`"))
            })?;
        if n < 0.0 {
            return Err(ParseError::InvalidResponseFormat(format!("negative `{name}`")));
        }
        Ok(n)
    };

    Ok(Macros {
        calories: field("calories")?.round(),
        protein: round_tenth(field("protein")?),
        carbs: round_tenth(field("carbs")?),
        fat: round_tenth(field("fat")?),
    })
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Deviation between reported and macro-derived calories. Infinite when
/// calories are zero but the macros are not.
pub(crate) fn calorie_deviation(macros: &Macros) -> f64 {
    let expected = macros.macro_calories().round();
    if macros.calories == 0.0 {
        return if expected == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (macros.calories - expected).abs() / macros.calories
}

fn check_calorie_consistency(macros: &Macros) {
    let deviation = calorie_deviation(macros);
    if deviation > CALORIE_TOLERANCE {
        warn!(
            provided = macros.calories,
            calculated = macros.macro_calories().round(),
            difference = deviation,
            "calorie calculation mismatch"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedLlm(Result<&'static str, &'static str>);

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, ParseError> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(msg) => Err(ParseError::ServiceUnavailable(msg.to_string())),
            }
        }
    }

    fn parser_with(reply: Result<&'static str, &'static str>) -> MealParser {
        MealParser::new(Some(Arc::new(CannedLlm(reply))))
    }

    #[tokio::test]
    async fn empty_text_is_invalid_input() {
        let err = MealParser::keyword_only().parse("   ").await.unwrap_err();
        assert!(matches!(err, ParseError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn falls_back_to_keywords_without_llm() {
        let parser = MealParser::keyword_only();
        assert!(!parser.uses_llm());
        let m = parser.parse("2 eggs").await.unwrap();
        assert_eq!(m, Macros::new(140.0, 12.0, 0.0, 10.0));
    }

    #[tokio::test]
    async fn json_wrapped_in_prose_is_extracted_and_rounded() {
        let parser = parser_with(Ok(
            "Sure! Here you go:\n{\"calories\": 164.6, \"protein\": 31.04, \"carbs\": 0, \"fat\": 3.56}\nEnjoy.",
        ));
        let m = parser.parse("chicken breast").await.unwrap();
        assert_eq!(m, Macros::new(165.0, 31.0, 0.0, 3.6));
    }

    #[tokio::test]
    async fn missing_field_is_invalid_format() {
        let parser = parser_with(Ok(r#"{"calories": 100, "protein": 5, "carbs": 10}"#));
        let err = parser.parse("soup").await.unwrap_err();
        assert!(matches!(err, ParseError::InvalidResponseFormat(_)));
    }

    #[tokio::test]
    async fn string_numbers_are_rejected() {
        let parser = parser_with(Ok(r#"{"calories": "100", "protein": 5, "carbs": 10, "fat": 1}"#));
        assert!(matches!(
            parser.parse("soup").await.unwrap_err(),
            ParseError::InvalidResponseFormat(_)
        ));
    }

    #[tokio::test]
    async fn prose_without_json_is_invalid_format() {
        let parser = parser_with(Ok("I cannot estimate that."));
        assert!(matches!(
            parser.parse("mystery").await.unwrap_err(),
            ParseError::InvalidResponseFormat(_)
        ));
    }

    #[tokio::test]
    async fn upstream_failure_is_not_retried_or_masked() {
        let parser = parser_with(Err("Failed to parse meal"));
        let err = parser.parse("2 eggs").await.unwrap_err();
        assert!(matches!(err, ParseError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn calorie_mismatch_is_returned_unchanged() {
        let parser = parser_with(Ok(r#"{"calories": 900, "protein": 10, "carbs": 10, "fat": 1}"#));
        let m = parser.parse("donut").await.unwrap();
        assert_eq!(m.calories, 900.0);
        assert!(calorie_deviation(&m) > CALORIE_TOLERANCE);
    }

    #[test]
    fn deviation_handles_zero_calories() {
        assert_eq!(calorie_deviation(&Macros::new(0.0, 0.0, 0.0, 0.0)), 0.0);
        assert!(calorie_deviation(&Macros::new(0.0, 1.0, 0.0, 0.0)).is_infinite());
        // 12*4 + 10*9 = 138
        assert_eq!(calorie_deviation(&Macros::new(138.0, 12.0, 0.0, 10.0)), 0.0);
        assert!(calorie_deviation(&Macros::new(140.0, 12.0, 0.0, 10.0)) < 0.02);
    }
}
