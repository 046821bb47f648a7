//! Static operation-to-backend routing table

use crate::config::BackendEndpoints;

/// The inbound operations the gateway proxies. Each maps to exactly one
/// backend; fan-out exists only for `/health` and `/v1/models`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ChatCompletions,
    Embeddings,
    Transcription,
    Speech,
}

/// One logical backend service, immutable for the process lifetime
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub name: &'static str,
    /// Base address with trailing slash stripped
    pub base_url: String,
    /// Primary status-probe path; the probe falls back to the root address
    pub health_path: &'static str,
    /// Model catalog path, for backends that expose one
    pub catalog_path: Option<&'static str>,
}

impl BackendDescriptor {
    /// Join a path onto the backend's base address
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn health_url(&self) -> String {
        self.url(self.health_path)
    }

    pub fn catalog_url(&self) -> Option<String> {
        self.catalog_path.map(|p| self.url(p))
    }
}

/// Fixed mapping from logical operation to backend. Built once from
/// configuration; never mutated.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    chat: BackendDescriptor,
    embeddings: BackendDescriptor,
    transcription: BackendDescriptor,
    speech: BackendDescriptor,
}

impl BackendRegistry {
    pub fn from_endpoints(endpoints: &BackendEndpoints) -> Self {
        Self {
            chat: BackendDescriptor {
                name: "bernard",
                base_url: endpoints.chat_url.clone(),
                // Bernard serves its status under /api, not /health
                health_path: "/api/status",
                catalog_path: Some("/api/v1/models"),
            },
            embeddings: BackendDescriptor {
                name: "vllm",
                base_url: endpoints.embeddings_url.clone(),
                health_path: "/health",
                catalog_path: Some("/v1/models"),
            },
            transcription: BackendDescriptor {
                name: "whisper",
                base_url: endpoints.transcription_url.clone(),
                health_path: "/health",
                catalog_path: None,
            },
            speech: BackendDescriptor {
                name: "kokoro",
                base_url: endpoints.speech_url.clone(),
                health_path: "/health",
                catalog_path: None,
            },
        }
    }

    /// Resolve an operation to its backend and outbound path
    pub fn route(&self, op: Operation) -> (&BackendDescriptor, &'static str) {
        match op {
            Operation::ChatCompletions => (&self.chat, "/api/v1/chat/completions"),
            Operation::Embeddings => (&self.embeddings, "/v1/embeddings"),
            Operation::Transcription => (&self.transcription, "/v1/audio/transcriptions"),
            Operation::Speech => (&self.speech, "/v1/audio/speech"),
        }
    }

    /// Full outbound URL for an operation
    pub fn target_url(&self, op: Operation) -> String {
        let (backend, path) = self.route(op);
        backend.url(path)
    }

    /// The backend whose catalog endpoint serves chat models
    pub fn chat(&self) -> &BackendDescriptor {
        &self.chat
    }

    /// The backend whose catalog endpoint serves embedding models
    pub fn embeddings(&self) -> &BackendDescriptor {
        &self.embeddings
    }

    /// All registered backends, in fixed probe order
    pub fn all(&self) -> [&BackendDescriptor; 4] {
        [&self.chat, &self.embeddings, &self.transcription, &self.speech]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_endpoints() -> BackendEndpoints {
        BackendEndpoints {
            chat_url: "http://chat:3000".to_string(),
            embeddings_url: "http://embed:8001".to_string(),
            transcription_url: "http://stt:8002".to_string(),
            speech_url: "http://tts:8003".to_string(),
        }
    }

    #[test]
    fn test_route_table() {
        let registry = BackendRegistry::from_endpoints(&test_endpoints());

        assert_eq!(
            registry.target_url(Operation::ChatCompletions),
            "http://chat:3000/api/v1/chat/completions"
        );
        assert_eq!(
            registry.target_url(Operation::Embeddings),
            "http://embed:8001/v1/embeddings"
        );
        assert_eq!(
            registry.target_url(Operation::Transcription),
            "http://stt:8002/v1/audio/transcriptions"
        );
        assert_eq!(
            registry.target_url(Operation::Speech),
            "http://tts:8003/v1/audio/speech"
        );
    }

    #[test]
    fn test_each_operation_maps_to_one_backend() {
        let registry = BackendRegistry::from_endpoints(&test_endpoints());

        let (chat, _) = registry.route(Operation::ChatCompletions);
        let (embed, _) = registry.route(Operation::Embeddings);
        let (stt, _) = registry.route(Operation::Transcription);
        let (tts, _) = registry.route(Operation::Speech);

        let names = [chat.name, embed.name, stt.name, tts.name];
        assert_eq!(names, ["bernard", "vllm", "whisper", "kokoro"]);
    }

    #[test]
    fn test_health_urls() {
        let registry = BackendRegistry::from_endpoints(&test_endpoints());

        let urls: Vec<String> = registry.all().iter().map(|b| b.health_url()).collect();
        assert_eq!(
            urls,
            vec![
                "http://chat:3000/api/status",
                "http://embed:8001/health",
                "http://stt:8002/health",
                "http://tts:8003/health",
            ]
        );
    }

    #[test]
    fn test_catalog_urls() {
        let registry = BackendRegistry::from_endpoints(&test_endpoints());

        assert_eq!(
            registry.chat().catalog_url(),
            Some("http://chat:3000/api/v1/models".to_string())
        );
        assert_eq!(
            registry.embeddings().catalog_url(),
            Some("http://embed:8001/v1/models".to_string())
        );

        let (stt, _) = registry.route(Operation::Transcription);
        let (tts, _) = registry.route(Operation::Speech);
        assert_eq!(stt.catalog_url(), None);
        assert_eq!(tts.catalog_url(), None);
    }
}
