use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct DeckEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DeckEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn run(&self) -> Result<String> {
        // Extract
        tracing::info!("🎵 Reading songs...");
        let songs = self.pipeline.extract()?;
        tracing::info!("🎵 Read {} song(s)", songs.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🃏 Deriving cards...");
        let result = self.pipeline.transform(songs)?;
        tracing::info!(
            "🃏 Derived {} card(s) from {} song(s), {} ambiguous",
            result.cards.len(),
            result.songs_processed,
            result.ambiguous.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing deck...");
        let output_path = self.pipeline.load(result)?;
        tracing::info!("💾 Deck saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
