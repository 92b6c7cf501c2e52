use std::io::Cursor;
use std::path::Path;

use pfr_projector::{
    config::ProjectorConfig, fetch::PageFetcher, prompt::Prompter, session::Session,
    workbook::ProjectionWorkbook,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const SEASON: i32 = 2025;

fn team_page(rush_att: u32, pass_att: u32) -> String {
    format!(
        r#"<html><body>
        <p><strong>Coach:</strong> <a href="/coaches/GannJo0.htm">Jonathan Gannon</a></p>
        <p><strong>Offensive Coordinator:</strong> <a href="/coordinators/PetzDr0.htm">Drew Petzing</a></p>
        <table id="team_stats"><tbody>
          <tr><td data-stat="pass_att">{}</td><td data-stat="rush_att">{}</td></tr>
        </tbody></table></body></html>"#,
        pass_att, rush_att
    )
}

const ROSTER: &str = r#"<html><body><div id="all_roster"><!--
    <table id="roster"><tbody>
      <tr><td data-stat="player"><a href="/players/M/MurrKy00.htm">Kyler Murray</a></td><td data-stat="pos">QB</td></tr>
      <tr><td data-stat="player"><a href="/players/H/HarrMa02.htm">Marvin Harrison Jr.</a></td><td data-stat="pos">WR</td></tr>
    </tbody></table>
    --></div></body></html>"#;

const QB_PAGE: &str = r#"<html><body>
    <table id="passing"><tbody>
      <tr id="passing.2024"><td data-stat="pass_att">541</td><td data-stat="pass_int_pct">2.0</td>
        <td data-stat="pass_td_pct">3.9</td><td data-stat="pass_cmp_pct">68.9</td></tr>
    </tbody></table>
    <!-- <table id="rushing_and_receiving"><tbody>
      <tr id="rushing_and_receiving.2024"><td data-stat="team_name_abbr">ARI</td><td data-stat="games">17</td>
        <td data-stat="rush_att">78</td><td data-stat="rush_yds">572</td><td data-stat="rush_td">2</td>
        <td data-stat="rush_yds_per_att">7.3</td></tr>
    </tbody></table> -->
    </body></html>"#;

// Rookie: no historical tables at all.
const WR_PAGE: &str = "<html><body><h1>Marvin Harrison Jr.</h1></body></html>";

fn config(base_url: &str, cache_dir: &Path) -> ProjectorConfig {
    let mut config = ProjectorConfig::default();
    config.scraping.base_url = base_url.to_string();
    config.rate_limits.request_delay_secs = 0;
    config.cache.dir = cache_dir.to_path_buf();
    config
}

fn run_session(config: &ProjectorConfig, workbook: &Path, script: &str) -> String {
    let fetcher = PageFetcher::new(config).unwrap();
    let prompter = Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
    let workbook = ProjectionWorkbook::open(workbook).unwrap();
    let mut session = Session::new(&fetcher, prompter, workbook, SEASON, config.scoring);
    session.run(&["crd".to_string()]).unwrap();
    String::from_utf8(session.into_prompter().into_output()).unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!((actual - expected).abs() < 1e-6, "expected {}, got {}", expected, actual);
}

#[test]
fn test_full_projection_session() {
    let mut server = mockito::Server::new();
    let mut mocks = Vec::new();
    for year in 2022..=2025 {
        mocks.push(
            server
                .mock("GET", format!("/teams/crd/{}.htm", year).as_str())
                .with_status(200)
                .with_body(team_page(400, 600))
                .expect(1)
                .create(),
        );
    }
    for (path, body) in [
        ("/teams/crd/2025_roster.htm", ROSTER),
        ("/players/M/MurrKy00.htm", QB_PAGE),
        ("/players/H/HarrMa02.htm", WR_PAGE),
    ] {
        mocks.push(
            server
                .mock("GET", path)
                .with_status(200)
                .with_body(body)
                .expect(1)
                .create(),
        );
    }

    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let workbook_path = dir.path().join("out/projections.xlsx");

    let script = [
        "y", // project crd
        "y", // team-level
        "1000", "40", "60",
        "y", // QBs
        "y", // Kyler Murray
        "17", "2", "10", "5", "0.01",
        "n", // another QB
        "y", // WRs
        "y", // Marvin Harrison Jr.
        "17", "25", "60", "14", "0.01", "0", "0", "0",
        "n", // another WR
        "n", // RBs
        "n", // TEs
    ]
    .join("\n")
        + "\n";

    let output = run_session(&config(&server.url(), &cache_dir), &workbook_path, &script);
    for mock in &mocks {
        mock.assert();
    }
    assert!(output.contains("Average rush %: 19.500"));
    assert!(output.contains("Estimated plays for 2025: "));
    assert!(cache_dir.join("crd/qb_KylerMurray.html").exists());
    assert!(cache_dir.join("crd/wr_MarvinHarrisonJr..html").exists());

    let workbook = ProjectionWorkbook::open(&workbook_path).unwrap();
    assert_eq!(
        workbook.sheet_names().collect::<Vec<_>>(),
        vec!["Crd", "QB", "WR", "RB", "TE"]
    );

    let crd = workbook.sheet("Crd").unwrap();
    assert_eq!(crd.len(), 4);
    assert_eq!(crd.rows()[0].number("Run Plays"), Some(400.0));
    assert_eq!(crd.rows()[3].text("Player Name"), Some("Other Players"));

    let qbs = workbook.sheet("QB").unwrap();
    assert_eq!(qbs.rows()[0].text("Player Name"), Some("Kyler Murray"));
    let expected = 200.0 * 0.1 + 2.0 * 6.0 - 12.0 * 2.0 + 4329.0 * 0.04 + 31.014 * 6.0;
    assert_close(qbs.rows()[0].number("Fantasy Points"), expected);

    let wrs = workbook.sheet("WR").unwrap();
    assert_eq!(wrs.len(), 1);
    assert_close(wrs.rows()[0].number("Fantasy Points"), 291.6);
}

#[test]
fn test_rerun_reads_cache_and_keeps_workbook() {
    let dir = tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let workbook_path = dir.path().join("projections.xlsx");

    let mut server = mockito::Server::new();
    for year in 2022..=2025 {
        server
            .mock("GET", format!("/teams/crd/{}.htm", year).as_str())
            .with_status(200)
            .with_body(team_page(400, 600))
            .create();
    }
    let first = "y\ny\n1000\n40\n60\nn\nn\nn\nn\n";
    run_session(&config(&server.url(), &cache_dir), &workbook_path, first);

    // Nothing listens here; every page must come from the cache.
    let offline = config("http://127.0.0.1:9", &cache_dir);
    let second = "y\nn\nn\nn\nn\nn\n";
    run_session(&offline, &workbook_path, second);

    let workbook = ProjectionWorkbook::open(&workbook_path).unwrap();
    let crd = workbook.sheet("Crd").unwrap();
    assert_eq!(crd.rows()[0].number("Total Plays"), Some(1000.0));
    assert_eq!(
        crd.rows()
            .iter()
            .filter(|r| r.text("Player Name") == Some("Other Players"))
            .count(),
        1
    );
}
