use std::sync::Mutex;

pub trait Observability: Send + Sync {
    fn emit_metric(&self, name: &str, value: f64, tags: &[(&str, String)]);
}

pub struct NoopMetrics;

impl Observability for NoopMetrics {
    fn emit_metric(&self, _name: &str, _value: f64, _tags: &[(&str, String)]) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub tags: Vec<(String, String)>,
}

/// Keeps every emitted sample in memory. Meant for tests and the CLI summary.
#[derive(Default)]
pub struct InMemoryMetrics {
    samples: Mutex<Vec<MetricSample>>,
}

impl InMemoryMetrics {
    pub fn samples(&self) -> Vec<MetricSample> {
        self.samples
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.samples()
            .iter()
            .rev()
            .find(|sample| sample.name == name)
            .map(|sample| sample.value)
    }
}

impl Observability for InMemoryMetrics {
    fn emit_metric(&self, name: &str, value: f64, tags: &[(&str, String)]) {
        if let Ok(mut guard) = self.samples.lock() {
            guard.push(MetricSample {
                name: name.to_string(),
                value,
                tags: tags
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect(),
            });
        }
    }
}
