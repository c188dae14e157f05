//! Startup data loading.
//!
//! Fetches the launch CSV over HTTP once. Any transport or status failure
//! falls back to a single read of a local copy; there are no retries. Both
//! paths share [`parse_csv`], so a fallback load yields exactly the table a
//! direct file load would.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::model::{LaunchRecord, LaunchTable};

/// Dataset published with the IBM data science lab material.
pub const DEFAULT_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBM-DS0321EN-SkillsNetwork/datasets/spacex_launch_dash.csv";
/// Local copy consulted when the download fails.
pub const DEFAULT_FALLBACK: &str = "spacex_launch_dash.csv";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_BYTES: usize = 16 * 1024 * 1024;

/// Where the table comes from.
#[derive(Debug, Clone)]
pub struct DataSource {
    /// Remote CSV resource.
    pub url: String,
    /// Local file read after a network failure.
    pub fallback_path: PathBuf,
    /// Connect/read timeout for the single download attempt.
    pub timeout: Duration,
    /// Upper bound on the downloaded body size.
    pub max_bytes: usize,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            fallback_path: PathBuf::from(DEFAULT_FALLBACK),
            timeout: DEFAULT_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Which source actually produced the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Remote(String),
    LocalFallback(PathBuf),
}

impl Origin {
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(url) => url.clone(),
            Self::LocalFallback(path) => path.display().to_string(),
        }
    }
}

/// A successfully loaded table.
#[derive(Debug)]
pub struct Loaded {
    pub table: LaunchTable,
    pub origin: Origin,
}

/// Download failure that triggers the local fallback.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(Box<ureq::Error>),
    #[error("failed to read response body: {0}")]
    Body(io::Error),
}

/// Fatal loading failures.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Download failed and the local copy could not be opened either.
    #[error("no data source available: download failed ({network}); fallback {path} unreadable: {source}")]
    NoSource {
        network: FetchError,
        path: PathBuf,
        source: io::Error,
    },
    /// The CSV was fetched but could not be parsed.
    #[error("malformed launch CSV from {origin}: {source}")]
    Csv { origin: String, source: csv::Error },
}

/// Load the launch table, falling back to the local file on network failure.
pub fn load(source: &DataSource) -> Result<Loaded, LoadError> {
    let agent = build_agent(source.timeout);
    match fetch_remote(&agent, &source.url, source.max_bytes) {
        Ok(bytes) => {
            debug!(bytes = bytes.len(), url = %source.url, "downloaded launch dataset");
            let table = parse_csv(bytes.as_slice()).map_err(|e| LoadError::Csv {
                origin: source.url.clone(),
                source: e,
            })?;
            info!(rows = table.len(), url = %source.url, "launch dataset downloaded and loaded");
            Ok(Loaded {
                table,
                origin: Origin::Remote(source.url.clone()),
            })
        }
        Err(network) => {
            warn!(error = %network, "error downloading data; trying local copy");
            let table = match load_file(&source.fallback_path) {
                Ok(table) => table,
                Err(FileLoadError::Open(io)) => {
                    return Err(LoadError::NoSource {
                        network,
                        path: source.fallback_path.clone(),
                        source: io,
                    })
                }
                Err(FileLoadError::Csv(e)) => {
                    return Err(LoadError::Csv {
                        origin: source.fallback_path.display().to_string(),
                        source: e,
                    })
                }
            };
            info!(rows = table.len(), path = %source.fallback_path.display(), "loaded local copy of the dataset");
            Ok(Loaded {
                table,
                origin: Origin::LocalFallback(source.fallback_path.clone()),
            })
        }
    }
}

#[derive(Debug)]
enum FileLoadError {
    Open(io::Error),
    Csv(csv::Error),
}

fn load_file(path: &Path) -> Result<LaunchTable, FileLoadError> {
    let file = File::open(path).map_err(FileLoadError::Open)?;
    parse_csv(file).map_err(FileLoadError::Csv)
}

/// Parse launch rows from CSV with a header line. Unknown columns are ignored.
pub fn parse_csv<R: Read>(reader: R) -> Result<LaunchTable, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let records = rdr
        .deserialize::<LaunchRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LaunchTable::new(records))
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .build()
}

/// One GET; non-2xx statuses surface as errors.
fn fetch_remote(agent: &ureq::Agent, url: &str, max_bytes: usize) -> Result<Vec<u8>, FetchError> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| FetchError::Request(Box::new(e)))?;
    read_response_bytes(response, max_bytes).map_err(FetchError::Body)
}

fn read_response_bytes(response: ureq::Response, max_bytes: usize) -> Result<Vec<u8>, io::Error> {
    if let Some(length) = response
        .header("Content-Length")
        .and_then(|v| v.parse::<u64>().ok())
    {
        if length > max_bytes as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Response too large: {length} bytes"),
            ));
        }
    }
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response exceeded {max_bytes} bytes"),
        ));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    const SAMPLE: &str = "\
Flight Number,Launch Site,class,Payload Mass (kg),Booster Version,Booster Version Category
1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0
2,CCAFS LC-40,1,525.0,F9 v1.0  B0005,v1.0
3,VAFB SLC-4E,1,9600.0,F9 FT B1029.1,FT
";

    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/spacex_launch_dash.csv", addr)
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/missing.csv", addr)
    }

    fn source(url: String, fallback: PathBuf) -> DataSource {
        DataSource {
            url,
            fallback_path: fallback,
            timeout: Duration::from_secs(5),
            max_bytes: 1024 * 1024,
        }
    }

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("launches.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn parse_csv_reads_named_columns_and_ignores_extras() {
        let table = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert_eq!(first.launch_site, "CCAFS LC-40");
        assert_eq!(first.payload_mass_kg, 0.0);
        assert!(!first.outcome.is_success());
        assert_eq!(first.booster_version_category, "v1.0");
    }

    #[test]
    fn parse_csv_rejects_class_outside_zero_one() {
        let bad = "Launch Site,class,Payload Mass (kg),Booster Version Category\nA,2,10,FT\n";
        assert!(parse_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn parse_csv_rejects_non_numeric_payload() {
        let bad = "Launch Site,class,Payload Mass (kg),Booster Version Category\nA,1,heavy,FT\n";
        assert!(parse_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn remote_download_is_preferred() {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
            SAMPLE.len(),
            SAMPLE
        );
        let url = serve_once(response);
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&source(url.clone(), dir.path().join("absent.csv"))).unwrap();
        assert_eq!(loaded.origin, Origin::Remote(url));
        assert_eq!(loaded.table.len(), 3);
    }

    #[test]
    fn transport_error_falls_back_to_identical_local_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());

        let loaded = load(&source(closed_port_url(), path.clone())).unwrap();
        let direct = parse_csv(File::open(&path).unwrap()).unwrap();

        assert_eq!(loaded.origin, Origin::LocalFallback(path));
        assert_eq!(loaded.table, direct);
    }

    #[test]
    fn http_error_status_falls_back() {
        let url = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n".to_string());
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let loaded = load(&source(url, path.clone())).unwrap();
        assert_eq!(loaded.origin, Origin::LocalFallback(path));
    }

    #[test]
    fn missing_fallback_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&source(closed_port_url(), dir.path().join("absent.csv"))).unwrap_err();
        assert!(matches!(err, LoadError::NoSource { .. }));
    }

    #[test]
    fn oversized_body_counts_as_network_failure() {
        let body = "x".repeat(64);
        let url = serve_once(format!("HTTP/1.0 200 OK\r\n\r\n{body}"));
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path());
        let mut src = source(url, path.clone());
        src.max_bytes = 16;
        let loaded = load(&src).unwrap();
        assert_eq!(loaded.origin, Origin::LocalFallback(path));
    }
}
