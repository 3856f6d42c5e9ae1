use serde::{Deserialize, Serialize};

use super::status::{ChainStatus, HealthStatus, RagSources, RagStatus};

const MISSING: &str = "-";

/// The four status payloads shown together on the overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub health: HealthStatus,
    pub rag: RagStatus,
    pub chains: ChainStatus,
    pub sources: RagSources,
}

impl Overview {
    /// The backend reports itself healthy.
    pub fn is_live(&self) -> bool {
        self.health.is_ok()
    }

    /// Labelled display values, `-` where the backend sent nothing.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let or_missing = |value: Option<String>| value.unwrap_or_else(|| MISSING.to_string());

        let worker = if self.health.worker_running {
            "Running"
        } else {
            "Stopped"
        };
        let tools = if self.chains.tools.is_empty() {
            MISSING.to_string()
        } else {
            self.chains.tools.join(", ")
        };

        vec![
            ("Service", or_missing(self.health.status.clone())),
            ("Worker", worker.to_string()),
            ("Queue", or_missing(self.health.queue_size.map(|n| n.to_string()))),
            (
                "Indexed chunks",
                or_missing(self.rag.indexed_chunks.map(|n| n.to_string())),
            ),
            ("Chain mode", or_missing(self.chains.chain_mode.clone())),
            ("Tools", tools),
            ("Embedding model", or_missing(self.rag.embedding_model.clone())),
            (
                "Sources detected",
                or_missing(self.sources.files_detected.map(|n| n.to_string())),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_fall_back_to_dash() {
        let fields = Overview::default().fields();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields[0], ("Service", "-".to_string()));
        assert_eq!(fields[1], ("Worker", "Stopped".to_string()));
        assert_eq!(fields[5], ("Tools", "-".to_string()));
    }

    #[test]
    fn test_fields_with_values() {
        let overview = Overview {
            health: HealthStatus {
                status: Some("ok".to_string()),
                worker_running: true,
                queue_size: Some(0),
                ..Default::default()
            },
            rag: RagStatus {
                indexed_chunks: Some(128),
                embedding_model: Some("all-MiniLM-L6-v2".to_string()),
            },
            chains: ChainStatus {
                chain_mode: Some("sequential".to_string()),
                tools: vec!["calculator".to_string(), "clock".to_string()],
            },
            sources: RagSources {
                files_detected: Some(3),
            },
        };

        assert!(overview.is_live());
        let fields = overview.fields();
        assert_eq!(fields[2].1, "0");
        assert_eq!(fields[3].1, "128");
        assert_eq!(fields[5].1, "calculator, clock");
        assert_eq!(fields[7].1, "3");
    }
}
