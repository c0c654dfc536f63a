// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Itinerary drafting via the Gemini REST API with a local fallback.
//!
//! The model is asked for a JSON document matching [`ItineraryDocument`].
//! Whenever no key is configured, the call fails, or the reply does not
//! parse into a non-empty itinerary, a deterministic template is returned
//! instead. Callers always get an itinerary.

use crate::models::{
    ActivityCategory, BudgetBreakdown, Coordinates, GeneratedItinerary, ItineraryDay,
    ItineraryDocument, ItinerarySource, PlannedActivity,
};
use crate::services::upstream::{check_response_json, UpstreamError};
use serde::Deserialize;

/// Share of the daily budget spent on the three fallback activities.
const ACTIVITY_SHARE: f64 = 0.6;
/// Share of the budget reported as the fallback's estimated total.
const ESTIMATED_SHARE: f64 = 0.9;

/// What to plan.
#[derive(Debug, Clone)]
pub struct ItineraryRequest {
    pub destination: String,
    pub budget: f64,
    /// Days, at least 1
    pub duration: u32,
    pub interests: Vec<String>,
}

/// Generates itineraries.
#[derive(Clone)]
pub struct ItineraryService {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ItineraryService {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }

    /// Draft an itinerary, falling back to the local template on any failure.
    pub async fn generate(&self, request: &ItineraryRequest) -> GeneratedItinerary {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No Gemini API key configured, using fallback itinerary");
            return fallback(request);
        };

        match self.try_generate(api_key, request).await {
            Ok(document) => {
                tracing::info!(
                    destination = %request.destination,
                    days = document.days.len(),
                    "Generated itinerary"
                );
                GeneratedItinerary {
                    document,
                    source: ItinerarySource::Ai,
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    destination = %request.destination,
                    "Itinerary generation failed, using fallback"
                );
                fallback(request)
            }
        }
    }

    async fn try_generate(
        &self,
        api_key: &str,
        request: &ItineraryRequest,
    ) -> Result<ItineraryDocument, UpstreamError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let reply: GenerateContentResponse = check_response_json(response).await?;

        let text = reply
            .text()
            .ok_or_else(|| UpstreamError::Parse("reply contained no text".to_string()))?;
        parse_reply(&text)
    }
}

fn fallback(request: &ItineraryRequest) -> GeneratedItinerary {
    GeneratedItinerary {
        document: fallback_itinerary(&request.destination, request.duration, request.budget),
        source: ItinerarySource::Fallback,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Deterministic itinerary: three activities a day sharing 60% of the
/// daily budget, with a 40/30/20/10 budget split.
pub fn fallback_itinerary(destination: &str, duration: u32, budget: f64) -> ItineraryDocument {
    let duration = duration.max(1);
    let daily_budget = budget / f64::from(duration);
    let activity_cost = daily_budget * ACTIVITY_SHARE / 3.0;

    let days = (1..=duration)
        .map(|day| ItineraryDay {
            day,
            activities: vec![
                PlannedActivity {
                    name: format!("Morning Exploration - Day {}", day),
                    description: format!("Explore popular attractions in {}", destination),
                    time: "09:00".to_string(),
                    duration: 3.0,
                    cost: round_cents(activity_cost),
                    category: ActivityCategory::Sightseeing,
                    location: Some(Coordinates::new(40.7128, -74.0060)),
                },
                PlannedActivity {
                    name: format!("Lunch & Local Experience - Day {}", day),
                    description: "Try local cuisine and cultural experiences".to_string(),
                    time: "13:00".to_string(),
                    duration: 2.0,
                    cost: round_cents(activity_cost * 0.8),
                    category: ActivityCategory::Dining,
                    location: Some(Coordinates::new(40.7589, -73.9851)),
                },
                PlannedActivity {
                    name: format!("Evening Activity - Day {}", day),
                    description: "Evening entertainment or relaxation".to_string(),
                    time: "18:00".to_string(),
                    duration: 3.0,
                    cost: round_cents(activity_cost * 1.2),
                    category: ActivityCategory::Entertainment,
                    location: Some(Coordinates::new(40.7505, -73.9934)),
                },
            ],
        })
        .collect();

    ItineraryDocument {
        days,
        total_estimated_cost: round_cents(budget * ESTIMATED_SHARE),
        budget_breakdown: BudgetBreakdown {
            accommodation: round_cents(budget * 0.4),
            food: round_cents(budget * 0.3),
            activities: round_cents(budget * 0.2),
            transportation: round_cents(budget * 0.1),
        },
    }
}

fn build_prompt(request: &ItineraryRequest) -> String {
    format!(
        r#"Create a detailed travel itinerary for:
Destination: {destination}
Budget: ${budget}
Duration: {duration} days
Interests: {interests}

Return only JSON with the following structure:
{{
  "days": [
    {{
      "day": 1,
      "activities": [
        {{
          "name": "Activity Name",
          "description": "Activity Description",
          "time": "HH:MM",
          "duration": 2,
          "cost": 50,
          "category": "sightseeing/dining/entertainment/shopping/culture",
          "location": {{"lat": 0.0, "lng": 0.0}}
        }}
      ]
    }}
  ],
  "total_estimated_cost": 1500,
  "budget_breakdown": {{
    "accommodation": 600,
    "food": 400,
    "activities": 300,
    "transportation": 200
  }}
}}

Make sure activities are realistic for the destination and fit within the budget.
Include 3-4 activities per day with appropriate timing and costs."#,
        destination = request.destination,
        budget = request.budget,
        duration = request.duration,
        interests = request.interests.join(", "),
    )
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_reply(text: &str) -> Result<ItineraryDocument, UpstreamError> {
    let document: ItineraryDocument = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| UpstreamError::Parse(format!("itinerary JSON: {}", e)))?;

    if document.days.is_empty() {
        return Err(UpstreamError::Parse("itinerary has no days".to_string()));
    }
    Ok(document)
}

// ─── Gemini response shape ───────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_costs() {
        let doc = fallback_itinerary("Paris", 2, 1000.0);

        assert_eq!(doc.days.len(), 2);
        assert_eq!(doc.total_estimated_cost, 900.0);
        assert_eq!(
            doc.budget_breakdown,
            BudgetBreakdown {
                accommodation: 400.0,
                food: 300.0,
                activities: 200.0,
                transportation: 100.0,
            }
        );

        for (index, day) in doc.days.iter().enumerate() {
            assert_eq!(day.day as usize, index + 1);
            let costs: Vec<f64> = day.activities.iter().map(|a| a.cost).collect();
            assert_eq!(costs, vec![100.0, 80.0, 120.0]);
            let times: Vec<&str> = day.activities.iter().map(|a| a.time.as_str()).collect();
            assert_eq!(times, vec!["09:00", "13:00", "18:00"]);
        }
        assert_eq!(doc.days[1].activities[0].name, "Morning Exploration - Day 2");
        assert!(doc.days[0].activities[0].description.contains("Paris"));
    }

    #[test]
    fn test_fallback_rounds_to_cents() {
        let doc = fallback_itinerary("Oslo", 3, 1000.0);
        // 1000 / 3 * 0.6 / 3 = 66.666...
        assert_eq!(doc.days[0].activities[0].cost, 66.67);
        assert_eq!(doc.days[0].activities[1].cost, 53.33);
        assert_eq!(doc.days[0].activities[2].cost, 80.0);
    }

    #[test]
    fn test_fallback_breakdown_sums_to_budget() {
        let doc = fallback_itinerary("Lima", 7, 2500.0);
        assert_eq!(doc.budget_breakdown.total(), 2500.0);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_parse_reply() {
        let reply = r#"```json
{
  "days": [{"day": 1, "activities": [
    {"name": "Louvre", "time": "10:00", "duration": 3, "cost": 22, "category": "culture"}
  ]}],
  "total_estimated_cost": 1500,
  "budget_breakdown": {"accommodation": 600, "food": 400, "activities": 300, "transportation": 200}
}
```"#;
        let doc = parse_reply(reply).unwrap();
        assert_eq!(doc.days[0].activities[0].category, ActivityCategory::Culture);
        assert_eq!(doc.total_estimated_cost, 1500.0);
    }

    #[test]
    fn test_parse_reply_rejects_empty_or_wrong_shape() {
        let empty = r#"{"days": [], "total_estimated_cost": 0,
            "budget_breakdown": {"accommodation": 0, "food": 0, "activities": 0, "transportation": 0}}"#;
        assert!(parse_reply(empty).is_err());
        assert!(parse_reply("Sorry, I can't help with that.").is_err());
        assert!(parse_reply(r#"{"itinerary": "Paris"}"#).is_err());
    }

    #[test]
    fn test_reply_text() {
        let reply: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\"" }, { "text": ":1}" }] } }]
        }))
        .unwrap();
        assert_eq!(reply.text().as_deref(), Some("{\"a\":1}"));

        let blocked: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": {} })).unwrap();
        assert!(blocked.text().is_none());
    }

    #[tokio::test]
    async fn test_generate_without_key_falls_back() {
        let service = ItineraryService::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9".to_string(),
            "gemini-1.5-flash".to_string(),
            None,
        );
        let request = ItineraryRequest {
            destination: "Paris".to_string(),
            budget: 1000.0,
            duration: 2,
            interests: vec!["art".to_string()],
        };

        let generated = service.generate(&request).await;
        assert_eq!(generated.source, ItinerarySource::Fallback);
        assert_eq!(generated.document, fallback_itinerary("Paris", 2, 1000.0));
    }
}
