//! End-to-end annotation runs against a mock UniProt service

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;
use surfaceome_annotate::{pipeline, AnnotateConfig, AnnotateError, ExtracellularStatus};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const P12345_FASTA: &str = ">sp|P12345|TEST_HUMAN Test protein\nMEEPQSDPSVEPPLSQ\nETFSDLWKLLPEN\n";

const P12345_ENTRY: &str = "\
ID   TEST_HUMAN              Reviewed;         29 AA.
AC   P12345;
FT   TOPO_DOM        1..20
FT                   /note=\"Extracellular\"
FT   TRANSMEM        21..29
FT                   /note=\"Helical\"
SQ   SEQUENCE   29 AA;
//
";

const INPUT: &str = "\
Peptide Sequence\tCharge\tAssigned Modifications\tProtein ID
SDPSVEPP\t2\t3S(79.9663)\tP12345
SDLWKLLPEN\t2\t5K(114.0429), 1S(79.9663)\tP12345
SDPSVEPP\t2\t\tP12345
SDPSVEPP\t3\t3S(79.9663)\tQ00001
MEEPQ\t2\t1M(15.9949)\tP99999
";

struct Fixture {
    _dir: TempDir,
    config: AnnotateConfig,
}

impl Fixture {
    fn new(server: &MockServer, input: &str, output_name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let input_path = dir.path().join("combined_modified_peptide.tsv");
        let reference_path = dir.path().join("surfaceome_accession_wollschied.txt");
        std::fs::write(&input_path, input).unwrap();
        std::fs::write(&reference_path, "P12345\nP99999\n").unwrap();

        let config = AnnotateConfig {
            input: input_path,
            reference: reference_path,
            output: dir.path().join(output_name),
            base_url: server.uri(),
            concurrency: 4,
            timeout: Duration::from_secs(5),
            max_retries: 0,
            show_progress: false,
            ..AnnotateConfig::default()
        };

        Self { _dir: dir, config }
    }

    fn output(&self) -> &Path {
        &self.config.output
    }
}

fn read_rows(path: &Path, delimiter: char) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect()
}

async fn mount(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_annotates_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/P12345.fasta"))
        .respond_with(ResponseTemplate::new(200).set_body_string(P12345_FASTA))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/P12345.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(P12345_ENTRY))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "/Q00001.fasta", 200, ">sp|Q00001|OTHER\nMSDPSVEPPK\n").await;
    mount(&server, "/Q00001.txt", 404, "").await;
    mount(&server, "/P99999.fasta", 404, "").await;

    let fixture = Fixture::new(&server, INPUT, "updated_peptide.tsv");
    let summary = pipeline::run(&fixture.config).await.unwrap();

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.rows_filtered, 1);
    assert_eq!(summary.sites, 5);
    assert_eq!(summary.count(ExtracellularStatus::Yes), 2);
    assert_eq!(summary.count(ExtracellularStatus::No), 1);
    assert_eq!(summary.count(ExtracellularStatus::NotAvailable), 1);
    assert_eq!(summary.count(ExtracellularStatus::ProteinNotFound), 1);

    let rows = read_rows(fixture.output(), '\t');
    assert_eq!(rows.len(), 5);
    assert_eq!(
        &rows[0][4..],
        ["Position in Protein", "Is Extracellular", "IsWollschied"]
    );
    // Extracellular site on a reference protein
    assert_eq!(&rows[1][3..], ["P12345", "8", "Yes", "Yes"]);
    // Two sites, in modification order
    assert_eq!(&rows[2][3..], ["P12345", "24, 20", "No, Yes", "Yes, Yes"]);
    // No topology record
    assert_eq!(&rows[3][3..], ["Q00001", "4", "Not Available", "No"]);
    // No sequence
    assert_eq!(
        &rows[4][3..],
        ["P99999", "", "Protein sequence not found", "Yes"]
    );
}

#[tokio::test]
async fn test_csv_output_when_requested() {
    let server = MockServer::start().await;
    mount(&server, "/P12345.fasta", 200, P12345_FASTA).await;
    mount(&server, "/P12345.txt", 200, P12345_ENTRY).await;

    let input = "Protein ID\tPeptide Sequence\tAssigned Modifications\nP12345\tSDPSVEPP\t3S(79.9663)\n";
    let fixture = Fixture::new(&server, input, "updated_peptide.csv");
    pipeline::run(&fixture.config).await.unwrap();

    let rows = read_rows(fixture.output(), ',');
    assert_eq!(rows[1], ["P12345", "SDPSVEPP", "3S(79.9663)", "8", "Yes", "Yes"]);
}

#[tokio::test]
async fn test_missing_column_writes_nothing() {
    let server = MockServer::start().await;
    let fixture = Fixture::new(&server, "Peptide Sequence\tProtein ID\nSDPSVEPP\tP12345\n", "out.tsv");

    let err = pipeline::run(&fixture.config).await.unwrap_err();

    assert!(matches!(err, AnnotateError::MissingColumn { .. }));
    assert!(!fixture.output().exists());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = AnnotateConfig {
        concurrency: 0,
        input: PathBuf::from("/nonexistent/input.tsv"),
        ..AnnotateConfig::default()
    };

    let err = pipeline::run(&config).await.unwrap_err();
    assert!(matches!(err, AnnotateError::Config(_)));
}
