use super::client::GeminiHttpClient;
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ASPECT_RATIO: &str = "1:1";
const SAFETY_FILTER_LEVEL: &str = "BLOCK_MEDIUM_AND_ABOVE";
const PERSON_GENERATION: &str = "DONT_ALLOW";

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParameters {
    sample_count: u32,
    aspect_ratio: String,
    safety_filter_level: String,
    person_generation: String,
    enhance_prompt: bool,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    /// Service-rewritten prompt, present when prompt enhancement is on.
    prompt: Option<String>,
}

pub struct ImagenClient {
    http: GeminiHttpClient,
}

impl ImagenClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl ImageGenerationService for ImagenClient {
    async fn generate_images(&self, prompt: &str, count: u32) -> Result<Vec<GeneratedImage>> {
        let request = PredictRequest {
            instances: vec![Instance {
                prompt: prompt.to_string(),
            }],
            parameters: GenerationParameters {
                sample_count: count,
                aspect_ratio: ASPECT_RATIO.to_string(),
                safety_filter_level: SAFETY_FILTER_LEVEL.to_string(),
                person_generation: PERSON_GENERATION.to_string(),
                enhance_prompt: true,
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        if response.predictions.is_empty() {
            return Err(Error::Parse(
                "No predictions in Imagen response".to_string(),
            ));
        }

        tracing::debug!("Imagen returned {} prediction(s)", response.predictions.len());

        use base64::Engine as _;
        response
            .predictions
            .into_iter()
            .map(|prediction| {
                let encoded = prediction.bytes_base64_encoded.ok_or_else(|| {
                    Error::Parse("Prediction without image bytes in Imagen response".to_string())
                })?;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| {
                        Error::Parse(format!("Failed to decode Imagen base64 image: {}", e))
                    })?;

                Ok(GeneratedImage {
                    bytes,
                    enhanced_prompt: prediction.prompt,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "imagen-3.0-generate-002";
    const PREDICT_PATH: &str = "/v1beta/models/imagen-3.0-generate-002:predict";

    fn make_client(server: &MockServer, api_key: &str) -> ImagenClient {
        ImagenClient::new(api_key.to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn encode(bytes: &[u8]) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[tokio::test]
    async fn test_generate_images_decodes_every_prediction() {
        let server = MockServer::start().await;

        let first = vec![0x89, 0x50, 0x4E, 0x47];
        let second = vec![0x01, 0x02];

        Mock::given(method("POST"))
            .and(path(PREDICT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [
                    {
                        "bytesBase64Encoded": encode(&first),
                        "mimeType": "image/png",
                        "prompt": "a highly detailed cat"
                    },
                    {
                        "bytesBase64Encoded": encode(&second),
                        "mimeType": "image/png"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let images = client.generate_images("a cat", 2).await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].bytes, first);
        assert_eq!(
            images[0].enhanced_prompt.as_deref(),
            Some("a highly detailed cat")
        );
        assert_eq!(images[1].bytes, second);
        assert!(images[1].enhanced_prompt.is_none());
    }

    #[tokio::test]
    async fn test_request_carries_count_and_fixed_options() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PREDICT_PATH))
            .and(body_string_contains("\"sampleCount\":3"))
            .and(body_string_contains("\"aspectRatio\":\"1:1\""))
            .and(body_string_contains("\"safetyFilterLevel\":\"BLOCK_MEDIUM_AND_ABOVE\""))
            .and(body_string_contains("\"personGeneration\":\"DONT_ALLOW\""))
            .and(body_string_contains("\"enhancePrompt\":true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": encode(&[0x00]) }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        client.generate_images("test", 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_transient_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PREDICT_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client.generate_images("a cat", 1).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 429, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_empty_prediction_list_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PREDICT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": []
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client.generate_images("a cat", 1).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_invalid_base64_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PREDICT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [{ "bytesBase64Encoded": "!!!invalid-base64!!!" }]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server, "key");

        let err = client.generate_images("a cat", 1).await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
