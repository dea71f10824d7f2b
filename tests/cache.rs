use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, SystemTime},
};

use ucdprops::{
    cache::{Cache, Config, INDEX_FILE, VERSION_MARKER},
    Error, UcdFile,
};

/// Nothing listens on the discard port, so any download attempt fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9/ucd/";

const FILE_COUNT: usize = 23;

fn samples() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/samples/ucd")
}

fn populate(dir: &Path) {
    let samples = samples();
    for file in <UcdFile as strum::IntoEnumIterator>::iter() {
        fs::copy(samples.join(file.name()), dir.join(file.name())).unwrap();
    }
}

/// Backdates the version marker by an hour and returns its new modification time.
fn age_marker(dir: &Path) -> SystemTime {
    File::options()
        .write(true)
        .open(dir.join(VERSION_MARKER))
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(3600))
        .unwrap();
    marker_modified(dir)
}

fn marker_modified(dir: &Path) -> SystemTime {
    fs::metadata(dir.join(VERSION_MARKER))
        .unwrap()
        .modified()
        .unwrap()
}

fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".part") || name.ends_with(".tmp"))
        .collect()
}

/// Plain HTTP server handing out the sample UCD files by their last path segment.
struct SampleServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl SampleServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let counter = Arc::clone(&counter);
                thread::spawn(move || serve(&stream, &counter));
            }
        });

        SampleServer {
            base_url: format!("http://127.0.0.1:{port}/ucd/"),
            hits,
        }
    }

    fn config(&self, dir: &Path) -> Config {
        Config::with_cache_dir(dir)
            .with_base_url(self.base_url.as_str())
            .with_download_timeout(Duration::from_secs(10))
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn serve(mut stream: &TcpStream, hits: &AtomicUsize) {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    if reader.read_line(&mut request).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header.trim_end().is_empty() => break,
            Ok(_) => {}
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    let name = request
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or_default();
    let (status, body) = match fs::read(samples().join(name)) {
        Ok(body) if !name.is_empty() => ("200 OK", body),
        _ => ("404 Not Found", b"not found".to_vec()),
    };

    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

#[test]
fn offline_load_persists_index() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let cache = Cache::new(Config::offline(dir.path()));
    assert!(cache.missing_files().is_empty());

    let first = cache.load().unwrap();
    assert!(dir.path().join(INDEX_FILE).is_file());
    assert_eq!(first.get(0x078A, "Name"), Some("THAANA LETTER FAAFU"));

    let second = cache.load().unwrap();
    assert_eq!(first, second);
}

#[test]
fn offline_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    std::fs::remove_file(dir.path().join("Scripts.txt")).unwrap();

    let cache = Cache::new(Config::offline(dir.path()));
    assert_eq!(cache.missing_files(), vec![UcdFile::Scripts]);

    match cache.load() {
        Err(Error::MissingSource(name)) => assert_eq!(name, "Scripts.txt"),
        other => panic!("expected a missing source error, got {other:?}"),
    }
}

#[test]
fn current_cache_needs_no_network() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    std::fs::write(dir.path().join(VERSION_MARKER), "16.0.0\n").unwrap();

    let config = Config::with_cache_dir(dir.path())
        .with_base_url(UNREACHABLE)
        .with_refresh_interval(None);
    let index = Cache::new(config).load().unwrap();

    assert_eq!(index.unicode_version(), Some("16.0.0"));
    assert_eq!(index.get(0x01E8, "Case_Folding_Mapping"), Some("01E9"));
}

#[test]
fn failed_download_is_retryable() {
    let dir = tempfile::tempdir().unwrap();

    let config = Config::with_cache_dir(dir.path())
        .with_base_url(UNREACHABLE)
        .with_download_timeout(Duration::from_secs(5));

    match Cache::new(config).load() {
        Err(error @ Error::Download { .. }) => assert!(error.is_retryable()),
        other => panic!("expected a download error, got {other:?}"),
    }
}

#[test]
fn concurrent_loads_agree() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let config = Config::offline(dir.path());
            thread::spawn(move || Cache::new(config).load())
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    assert_eq!(results[0], results[1]);
    assert_eq!(results[0].get(0x0915, "USE_Category"), Some("B"));
}

#[test]
fn fresh_download_fills_cache() {
    let server = SampleServer::start();
    let dir = tempfile::tempdir().unwrap();

    let index = Cache::new(server.config(dir.path())).load().unwrap();

    assert_eq!(server.hits(), FILE_COUNT);
    assert_eq!(index.unicode_version(), Some("16.0.0"));
    assert_eq!(index.get(0x078A, "Name"), Some("THAANA LETTER FAAFU"));
    assert_eq!(
        fs::read_to_string(dir.path().join(VERSION_MARKER)).unwrap(),
        "16.0.0\n"
    );
    assert!(dir.path().join(INDEX_FILE).is_file());
    assert!(dir.path().join("emoji-data.txt").is_file());
    assert!(dir.path().join("WordBreakProperty.txt").is_file());
    assert!(leftovers(dir.path()).is_empty());
}

#[test]
fn stale_marker_with_newer_remote_redownloads() {
    let server = SampleServer::start();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join(VERSION_MARKER), "15.0.0\n").unwrap();

    let old = Cache::new(Config::offline(dir.path())).load().unwrap();
    assert_eq!(old.unicode_version(), Some("15.0.0"));
    age_marker(dir.path());

    let config = server
        .config(dir.path())
        .with_refresh_interval(Some(Duration::from_secs(60)));
    let index = Cache::new(config).load().unwrap();

    // One version check, then every file.
    assert_eq!(server.hits(), FILE_COUNT + 1);
    assert_eq!(index.unicode_version(), Some("16.0.0"));
    assert_eq!(
        fs::read_to_string(dir.path().join(VERSION_MARKER)).unwrap(),
        "16.0.0\n"
    );

    let persisted = Cache::new(Config::offline(dir.path())).load().unwrap();
    assert_eq!(persisted.unicode_version(), Some("16.0.0"));
    assert_eq!(persisted, index);
}

#[test]
fn stale_marker_with_same_remote_is_touched() {
    let server = SampleServer::start();
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join(VERSION_MARKER), "16.0.0\n").unwrap();
    let aged = age_marker(dir.path());

    let config = server
        .config(dir.path())
        .with_refresh_interval(Some(Duration::from_secs(60)));
    let index = Cache::new(config).load().unwrap();

    assert_eq!(server.hits(), 1);
    assert_eq!(index.unicode_version(), Some("16.0.0"));
    assert!(marker_modified(dir.path()) > aged);
}

#[test]
fn failed_version_check_keeps_cache() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    fs::write(dir.path().join(VERSION_MARKER), "16.0.0\n").unwrap();
    let aged = age_marker(dir.path());

    let config = Config::with_cache_dir(dir.path())
        .with_base_url(UNREACHABLE)
        .with_refresh_interval(Some(Duration::from_secs(60)))
        .with_download_timeout(Duration::from_secs(5));
    let index = Cache::new(config).load().unwrap();

    assert_eq!(index.unicode_version(), Some("16.0.0"));
    assert_eq!(index.get(0x0915, "USE_Category"), Some("B"));
    assert_eq!(marker_modified(dir.path()), aged);
}

#[test]
fn concurrent_loads_from_empty_cache_download_once() {
    let server = SampleServer::start();
    let dir = tempfile::tempdir().unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let config = server.config(dir.path());
            thread::spawn(move || Cache::new(config).load())
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    assert_eq!(results[0], results[1]);
    assert_eq!(server.hits(), FILE_COUNT);
    assert!(leftovers(dir.path()).is_empty());
}
