use ads_dashboard::models::{campaign_kind, MetricTotals};
use ads_dashboard::sample::{RandomSamples, SampleDataProvider};
use ads_dashboard::{
    AdsClient, AppConfig, DashboardFetcher, GranularitySelection, MetricsCache, aggregate,
    classify_nonzero, client, compute_kpis, format_kpi_value, kpi,
};
use chrono::Local;
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = config.cache_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let client = AdsClient::new(config.api_base_url.clone());
    let cache = MetricsCache::open(&config.cache_path);
    let fetcher = DashboardFetcher::new(client.clone(), cache);

    let accounts = fetcher.fetch_accounts().await;
    info!("loaded {} accounts from {}", accounts.len(), config.api_base_url);

    if !accounts.is_empty() {
        let today = fetcher.today_click_totals(&accounts).await;
        println!(
            "Today across {} accounts: {} clicks, {} impressions, {} spend",
            accounts.len(),
            format_kpi_value("clicks", today.clicks as f64),
            format_kpi_value("impressions", today.impressions as f64),
            format_kpi_value("cost", today.cost),
        );
    }

    let customer_id = config
        .customer_id
        .clone()
        .or_else(|| accounts.first().map(|account| account.id.clone()));
    let Some(customer_id) = customer_id else {
        warn!("no account available; set ADS_CUSTOMER_ID or check the backend");
        return Ok(());
    };

    let days = config.date_range_days;
    let mut history = fetcher.fetch_historical(&customer_id, days).await;
    if history.is_empty() && config.sample_fallback {
        println!("-- no live data, showing SAMPLE rows --");
        history = RandomSamples.daily_rows(Local::now().date_naive(), days);
    }

    let mut selection = GranularitySelection::default();
    if let Some(granularity) = config.granularity {
        selection.set_override(granularity);
    }
    let granularity = selection.resolve(days);
    let buckets = aggregate(&history, granularity);
    println!("\n{} series for account {customer_id} ({days} days):", granularity.as_str());
    for bucket in &buckets {
        println!(
            "  {:<10} clicks {:>9}  cost {:>11}  ROAS {:>6}",
            bucket.label,
            format_kpi_value("clicks", bucket.clicks as f64),
            format_kpi_value("cost", bucket.cost),
            format_kpi_value("roas", bucket.roas),
        );
    }

    let mut totals = MetricTotals::default();
    for row in &history {
        totals.add_row(row);
    }
    let report = compute_kpis(&totals);
    println!("\nPeriod KPIs:");
    for (id, value) in [
        ("impressions", report.totals.impressions as f64),
        ("clicks", report.totals.clicks as f64),
        ("cost", report.totals.cost),
        ("conversions", report.totals.conversions),
        ("conversionsValue", report.totals.conversions_value),
        ("ctr", report.ratios.ctr),
        ("avgCpc", report.ratios.avg_cpc),
        ("conversionRate", report.ratios.conversion_rate),
        ("cpa", report.ratios.cpa),
        ("roas", report.ratios.roas),
        ("poas", report.ratios.poas),
    ] {
        println!("  {id:<18} {}", format_kpi_value(id, value));
    }

    let comparison = fetcher.fetch_kpi_comparison(&customer_id, days).await;
    if !comparison.is_empty() {
        println!("\nVersus previous period:");
        for (id, delta) in &comparison {
            println!("  {id:<18} {delta:+.1}%  {}", kpi::change_quality(*delta, id));
        }
    }

    let campaigns = fetcher.fetch_campaigns(&customer_id, days).await;
    if !campaigns.campaigns.is_empty() {
        let peer_clicks: Vec<f64> = campaigns
            .campaigns
            .iter()
            .map(|campaign| campaign.totals.clicks as f64)
            .collect();
        println!("\nCampaigns:");
        for campaign in &campaigns.campaigns {
            let tier = classify_nonzero(campaign.totals.clicks as f64, &peer_clicks, "clicks");
            println!(
                "  {:<40} {:<16} clicks {:>9}  {:?}",
                campaign.name,
                format!("{:?}", campaign_kind(&campaign.name)),
                format_kpi_value("clicks", campaign.totals.clicks as f64),
                tier,
            );
        }
    }

    if config.watch_anomalies {
        let feed = client::spawn_anomaly_monitor(client, client::ANOMALY_REFRESH);
        info!("watching anomalies every 5 minutes, Ctrl+C to stop");
        loop {
            tokio::time::sleep(client::ANOMALY_REFRESH).await;
            let snapshot = feed.lock().await.clone();
            println!(
                "anomalies: {} total ({} high / {} medium / {} low)",
                snapshot.summary.total,
                snapshot.summary.high,
                snapshot.summary.medium,
                snapshot.summary.low,
            );
        }
    }

    match client.anomalies().await {
        Ok(feed) => {
            println!(
                "\nAnomalies: {} total ({} high)",
                feed.summary.total, feed.summary.high
            );
            for anomaly in feed.anomalies.iter().take(5) {
                println!("  [{}] {}: {}", anomaly.severity, anomaly.metric, anomaly.message);
            }
        }
        Err(err) => warn!("anomaly fetch failed: {err}"),
    }

    Ok(())
}
