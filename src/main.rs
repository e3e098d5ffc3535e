use anyhow::Result;
use ecoreport::integration::{EcoReportConfig, FlowEvent, ReportFlow};
use ecoreport::report::Category;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecoreport=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EcoReport");

    let config = EcoReportConfig::from_env()?;
    let flow = ReportFlow::builder().with_config(config).build()?;

    // Scripted session against the simulated devices
    flow.take_photo().await?;
    flow.start_voice_recording().await?;
    flow.stop_voice_recording().await?;
    flow.fetch_current_location().await?;
    flow.set_category(Some(Category::Overflowing));
    flow.set_description("Bins on the corner have not been emptied this week");

    if let Some(report) = flow.submit().await? {
        info!("Submitted report:\n{}", serde_json::to_string_pretty(&report)?);
    }

    if let Err(e) = flow.redeem_reward("groceries") {
        warn!("Redemption refused: {}", e.user_message());
    }
    flow.redeem_reward("airtime")?;

    for event in flow.drain_events() {
        if let FlowEvent::Error { message, .. } = &event {
            warn!("Alert shown: {}", message);
        }
    }

    let snapshot = flow.snapshot();
    info!("Balance: {} points", snapshot.balance);
    for report in &snapshot.recent_reports {
        info!(
            "Recent: #{} {} - {} ({}, +{})",
            report.id.unwrap_or_default(),
            report.title,
            report.location,
            report.status,
            report.points
        );
    }

    Ok(())
}
