//! Shared analysis pipeline used by both the `run` and `interactive` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch both -> normalize both -> render chart -> join/summarize -> export CSV
//!
//! Fetch and normalization failures abort the run. Rendering and the
//! analysis/export step are independent: either may fail without affecting the other.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::analysis::{merge, summarize};
use crate::data::{TransparencyClient, normalize};
use crate::domain::{
    ActivationRow, AnalysisRow, ImbalanceRow, NormalizedSeries, RegulationSummary, SeriesKind, SeriesRow,
    TimeWindow,
};
use crate::error::{AnalysisError, ExportError, PipelineError, RenderError};
use crate::io::write_analysis_csv;
use crate::plot::render_regulation_chart;

/// Settings for one pipeline run, built from CLI arguments.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub base_url: String,
    pub csv_path: PathBuf,
    pub chart_path: PathBuf,
    pub dpi: u32,
    pub preview_rows: usize,
}

/// Everything a run produced, including per-output failures.
#[derive(Debug)]
pub struct RunReport {
    pub window: TimeWindow,
    pub imbalance: NormalizedSeries<ImbalanceRow>,
    pub activation: NormalizedSeries<ActivationRow>,
    pub rows: Vec<AnalysisRow>,
    pub summary: Result<RegulationSummary, AnalysisError>,
    /// `None` when the join was empty and there was nothing to write.
    pub export: Option<Result<PathBuf, ExportError>>,
    pub chart: Result<PathBuf, RenderError>,
}

/// Execute one run for `window`.
pub fn run_pipeline(
    client: &TransparencyClient,
    config: &PipelineConfig,
    window: &TimeWindow,
) -> Result<RunReport, PipelineError> {
    // 1) Fetch both series, then normalize both.
    let imbalance_data = fetch(client, SeriesKind::Imbalance, window)?;
    let activation_data = fetch(client, SeriesKind::Activation, window)?;
    let imbalance = normalize_series::<ImbalanceRow>(&imbalance_data, window)?;
    let activation = normalize_series::<ActivationRow>(&activation_data, window)?;

    // 2) Chart.
    let chart = render_regulation_chart(&config.chart_path, config.dpi, window, &imbalance, &activation)
        .map(|()| config.chart_path.clone());
    match &chart {
        Ok(path) => info!(path = %path.display(), "chart written"),
        Err(e) => error!("Error creating visualization: {e}"),
    }

    // 3) Join, summarize, export.
    let rows = merge(&imbalance, &activation);
    let summary = summarize(&rows);
    if let Err(e) = &summary {
        error!("Error in regulation analysis: {e}");
    }

    let export = (!rows.is_empty()).then(|| {
        let result = write_analysis_csv(&config.csv_path, &rows).map(|()| config.csv_path.clone());
        match &result {
            Ok(path) => info!(path = %path.display(), rows = rows.len(), "analysis CSV written"),
            Err(e) => error!("Error writing regulation analysis: {e}"),
        }
        result
    });

    Ok(RunReport {
        window: *window,
        imbalance,
        activation,
        rows,
        summary,
        export,
        chart,
    })
}

fn fetch(
    client: &TransparencyClient,
    kind: SeriesKind,
    window: &TimeWindow,
) -> Result<Value, PipelineError> {
    info!("Fetching {} data...", kind.display_name().to_lowercase());
    let data = client.fetch_series(kind, window).inspect_err(|e| {
        error!("Error fetching data: {e}");
    })?;
    Ok(data)
}

/// Normalize one payload to the exact window.
///
/// An empty table after clipping counts as "no data" for this run.
fn normalize_series<R: SeriesRow>(
    data: &Value,
    window: &TimeWindow,
) -> Result<NormalizedSeries<R>, PipelineError> {
    let kind = R::KIND;
    let series = normalize::<R>(data, window).inspect_err(|e| {
        error!("Error processing {} data: {e}", kind.display_name());
    })?;

    if series.is_empty() {
        warn!(series = kind.api_id(), "no points inside the requested window");
        return Err(PipelineError::NoData {
            series: kind.display_name(),
        });
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Mock, Server, ServerGuard};
    use serde_json::json;

    use crate::domain::parse_civil;

    fn window() -> TimeWindow {
        TimeWindow::new(
            parse_civil("2024-09-23 00:00").unwrap(),
            parse_civil("2024-09-24 00:00").unwrap(),
        )
        .unwrap()
    }

    fn config(dir: &std::path::Path, server: &ServerGuard) -> PipelineConfig {
        PipelineConfig {
            base_url: format!("{}/export", server.url()),
            csv_path: dir.join("regulation_analysis.csv"),
            chart_path: dir.join("baltic_regulation_analysis.png"),
            dpi: 50,
            preview_rows: 5,
        }
    }

    fn mock_series(server: &mut ServerGuard, id: &str, points: serde_json::Value) -> Mock {
        server
            .mock("GET", "/export")
            .match_query(Matcher::UrlEncoded("id".into(), id.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": { "timeseries": points } }).to_string())
            .create()
    }

    #[test]
    fn full_run_joins_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new();
        let imb = mock_series(
            &mut server,
            "imbalance_volumes",
            json!([
                {"from": "2024-09-22T21:00Z", "to": "2024-09-22T22:00Z", "values": [999.0]},
                {"from": "2024-09-23T00:00Z", "to": "2024-09-23T01:00Z", "values": [150.0]},
                {"from": "2024-09-23T01:00Z", "to": "2024-09-23T02:00Z", "values": [-40.0]}
            ]),
        );
        let act = mock_series(
            &mut server,
            "normal_activations_total",
            json!([
                {"from": "2024-09-23T00:00Z", "to": "2024-09-23T01:00Z", "values": [5.0, 30.0]},
                {"from": "2024-09-23T02:00Z", "to": "2024-09-23T03:00Z", "values": [10.0, 0.0]}
            ]),
        );

        let config = config(dir.path(), &server);
        let client = TransparencyClient::new(config.base_url.clone()).unwrap();
        let report = run_pipeline(&client, &config, &window()).unwrap();

        imb.assert();
        act.assert();

        let chart_path = report.chart.as_ref().unwrap();
        assert!(chart_path.exists());
        assert!(std::fs::metadata(chart_path).unwrap().len() > 0);

        // Padding row before the window is dropped.
        assert_eq!(report.imbalance.len(), 2);
        assert_eq!(report.activation.len(), 2);
        // Only 00:00Z exists in both series.
        assert_eq!(report.rows.len(), 1);
        assert!(report.rows[0].appropriate_regulation);

        let summary = report.summary.as_ref().unwrap();
        assert_eq!(summary.total_periods, 1);
        assert_eq!(summary.effective_periods, 1);

        let csv_path = report.export.unwrap().unwrap();
        let text = std::fs::read_to_string(csv_path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("2024-09-23 02:00:00+02:00,150.0,5.0,30.0,150.0,35.0,true,2,2024-09-23"));
    }

    #[test]
    fn http_500_aborts_without_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new();
        let _mock = server
            .mock("GET", "/export")
            .match_query(Matcher::Any)
            .with_status(500)
            .create();

        let config = config(dir.path(), &server);
        let client = TransparencyClient::new(config.base_url.clone()).unwrap();
        let err = run_pipeline(&client, &config, &window()).unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(_)));
        assert!(!config.csv_path.exists());
        assert!(!config.chart_path.exists());
    }

    #[test]
    fn malformed_payload_aborts_as_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new();
        let imb = mock_series(&mut server, "imbalance_volumes", json!([]));
        let act = mock_series(
            &mut server,
            "normal_activations_total",
            json!([{"from": "2024-09-23T00:00Z", "to": "2024-09-23T01:00Z", "values": [1.0, 1.0]}]),
        );

        let config = config(dir.path(), &server);
        let client = TransparencyClient::new(config.base_url.clone()).unwrap();
        let err = run_pipeline(&client, &config, &window()).unwrap_err();

        // Both requests go out before either payload is inspected.
        imb.assert();
        act.assert();
        assert!(matches!(err, PipelineError::Normalize(_)));
        assert!(!config.csv_path.exists());
        assert!(!config.chart_path.exists());
    }

    #[test]
    fn disjoint_series_skip_export_but_report_analysis_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Server::new();
        let _imb = mock_series(
            &mut server,
            "imbalance_volumes",
            json!([{"from": "2024-09-23T00:00Z", "to": "2024-09-23T01:00Z", "values": [1.0]}]),
        );
        let _act = mock_series(
            &mut server,
            "normal_activations_total",
            json!([{"from": "2024-09-23T05:00Z", "to": "2024-09-23T06:00Z", "values": [1.0, 1.0]}]),
        );

        let config = config(dir.path(), &server);
        let client = TransparencyClient::new(config.base_url.clone()).unwrap();
        let report = run_pipeline(&client, &config, &window()).unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.summary, Err(AnalysisError::EmptyJoin));
        assert!(report.export.is_none());
        assert!(!config.csv_path.exists());
    }
}
