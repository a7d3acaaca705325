use sha2::{Digest, Sha256};
use std::path::PathBuf;
use swrepo_core::{Compatibility, LoadError, LoadImage, PartNumber, RepoConfig, RepoError, Repository};
use tempfile::TempDir;

/// A repository rooted in a temp dir plus a separate directory for inputs.
struct TestContext {
    _temp_dir: TempDir,
    root: PathBuf,
    inbox: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = temp_dir.path().join("images");
        let inbox = temp_dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).expect("failed to create inbox");
        Self {
            _temp_dir: temp_dir,
            root,
            inbox,
        }
    }

    fn config(&self) -> RepoConfig {
        RepoConfig::new(&self.root)
    }

    fn open(&self) -> Repository {
        Repository::open(self.config()).expect("failed to open repository")
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.inbox.join(name);
        std::fs::write(&path, bytes).expect("failed to write input");
        path
    }

    fn load(&self, name: &str, pn: &str, payload: &[u8]) -> PathBuf {
        self.write(name, &LoadImage::encode(&pn_of(pn), payload))
    }

    fn root_entries(&self) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(&self.root)
            .expect("failed to list root")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn pn_of(s: &str) -> PartNumber {
    PartNumber::new(s).unwrap()
}

fn manifest_pns(repo: &Repository) -> Vec<String> {
    repo.compatibility()
        .unwrap()
        .into_iter()
        .map(|c| c.part_number)
        .collect()
}

const FRAGMENT_A: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<COMPATIBILITY>
    <SOFTWARE PN="00000001">
        <LRU name="LRU_EX1_LEFT" PN="EXEMPLO3"/>
        <LRU name="LRU_EX1_CENTER" PN="EXEMPLO4"/>
        <LRU name="LRU_EX1_RIGHT" PN="EXEMPLO5"/>
    </SOFTWARE>
    <SOFTWARE PN="00000002">
        <LRU name="LRU_EX2" PN="EXEMPLO1"/>
    </SOFTWARE>
</COMPATIBILITY>
"#;

const FRAGMENT_B: &str = r#"<COMPATIBILITY>
    <SOFTWARE PN="00000003">
        <LRU name="LRU_EX3" PN="EXEMPLO6"/>
    </SOFTWARE>
</COMPATIBILITY>
"#;

const FILTERED_00000001: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    <COMPATIBILITY>\n\
    \x20   <SOFTWARE PN=\"00000001\">\n\
    \x20       <LRU name=\"LRU_EX1_LEFT\" PN=\"EXEMPLO3\"/>\n\
    \x20       <LRU name=\"LRU_EX1_CENTER\" PN=\"EXEMPLO4\"/>\n\
    \x20       <LRU name=\"LRU_EX1_RIGHT\" PN=\"EXEMPLO5\"/>\n\
    \x20   </SOFTWARE>\n\
    </COMPATIBILITY>\n";

#[test]
fn test_import_forty_byte_load() {
    let ctx = TestContext::new();
    let payload = [0xDE, 0xAD, 0xBE, 0xEF];
    let mut bytes = vec![0x00, 0x00, 0x00, 0x01];
    bytes.extend_from_slice(&Sha256::digest(payload));
    bytes.extend_from_slice(&payload);
    assert_eq!(bytes.len(), 40);
    let input = ctx.write("load1.bin", &bytes);

    let mut repo = ctx.open();
    let pn = repo.import(&input).unwrap();

    assert_eq!(pn.as_str(), "00000001");
    assert_eq!(repo.list(), vec![pn_of("00000001")]);

    let stored = repo.path(&pn).unwrap();
    assert_eq!(stored, ctx.root.join("00000001.bin"));
    assert_eq!(std::fs::read(stored).unwrap(), bytes);
}

#[test]
fn test_tampered_digest_is_rejected_without_side_effects() {
    let ctx = TestContext::new();
    let mut bytes = LoadImage::encode(&pn_of("00000001"), b"payload");
    bytes[4] ^= 0x01;
    let input = ctx.write("bad.bin", &bytes);

    let mut repo = ctx.open();
    let err = repo.import(&input).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Load(LoadError::ChecksumMismatch { .. })
    ));
    assert!(repo.list().is_empty());
    assert!(ctx.root_entries().is_empty());
}

#[test]
fn test_truncated_load_is_rejected_without_side_effects() {
    let ctx = TestContext::new();
    let bytes = LoadImage::encode(&pn_of("00000001"), b"");
    let input = ctx.write("short.bin", &bytes[..35]);

    let mut repo = ctx.open();
    let err = repo.import(&input).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Load(LoadError::TooShort { len: 35, .. })
    ));
    assert!(ctx.root_entries().is_empty());
}

#[test]
fn test_list_contains_exactly_imported_loads() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    for (i, pn) in ["00000003", "00000001", "00000002"].iter().enumerate() {
        let input = ctx.load(&format!("load{i}.bin"), pn, pn.as_bytes());
        repo.import(&input).unwrap();
    }

    assert_eq!(
        repo.list(),
        vec![pn_of("00000001"), pn_of("00000002"), pn_of("00000003")]
    );
}

#[test]
fn test_reimport_points_at_latest_copy() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();

    let first = ctx.load("v1.bin", "0000000A", b"version one");
    let second = ctx.load("v2.bin", "0000000A", b"version two");

    assert_eq!(repo.import(&first).unwrap(), pn_of("0000000A"));
    assert_eq!(repo.import(&second).unwrap(), pn_of("0000000A"));

    let stored = repo.path(&pn_of("0000000A")).unwrap();
    assert_eq!(
        std::fs::read(stored).unwrap(),
        std::fs::read(&second).unwrap()
    );
    assert_eq!(repo.list().len(), 1);
}

#[test]
fn test_load_with_reserved_part_number_is_protected() {
    let ctx = TestContext::new();
    let input = ctx.load("zero.bin", "00000000", b"not a manifest");

    let mut repo = ctx.open();
    assert!(matches!(
        repo.import(&input).unwrap_err(),
        RepoError::Protected(_)
    ));
    assert!(ctx.root_entries().is_empty());
}

#[test]
fn test_remove_reserved_and_unknown() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();

    assert!(matches!(
        repo.remove(&pn_of("00000000")).unwrap_err(),
        RepoError::Protected(_)
    ));
    assert!(matches!(
        repo.remove(&pn_of("DEADBEEF")).unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert!(repo.has_manifest());
}

#[test]
fn test_remove_deletes_file_and_entry() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    let pn = repo
        .import(&ctx.load("l.bin", "00000005", b"five"))
        .unwrap();
    assert!(!repo.is_empty());

    let removed = repo.remove(&pn).unwrap();

    assert!(!removed.exists());
    assert!(repo.is_empty());
    assert!(repo.list().is_empty());
    assert!(matches!(repo.path(&pn).unwrap_err(), RepoError::NotFound(_)));
}

#[test]
fn test_remove_tolerates_missing_file() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    let pn = repo
        .import(&ctx.load("l.bin", "00000005", b"five"))
        .unwrap();
    std::fs::remove_file(repo.path(&pn).unwrap()).unwrap();

    repo.remove(&pn).unwrap();
    assert!(repo.list().is_empty());
}

#[test]
fn test_first_manifest_is_copied_verbatim() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    let pn = repo
        .import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();

    assert_eq!(pn, PartNumber::compatibility());
    let stored = repo.path(&pn).unwrap();
    assert_eq!(stored, ctx.root.join("compatibility.xml"));
    assert_eq!(std::fs::read_to_string(stored).unwrap(), FRAGMENT_A);
    assert!(repo.list().is_empty());
}

#[test]
fn test_disjoint_manifests_merge_to_union() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    repo.import(&ctx.write("b.xml", FRAGMENT_B.as_bytes()))
        .unwrap();

    assert_eq!(manifest_pns(&repo), vec!["00000001", "00000002", "00000003"]);
    let entries = repo.compatibility().unwrap();
    assert_eq!(entries[0].lrus.len(), 3);
    assert_eq!(entries[2].lrus[0].part_number.as_deref(), Some("EXEMPLO6"));
}

#[test]
fn test_redefined_pn_replaces_and_moves_to_end() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    repo.import(&ctx.write("b.xml", FRAGMENT_B.as_bytes()))
        .unwrap();
    let redefine = r#"<COMPATIBILITY><SOFTWARE PN="00000001"><LRU name="NEW" PN="EXEMPLO9"/></SOFTWARE></COMPATIBILITY>"#;
    repo.import(&ctx.write("c.xml", redefine.as_bytes()))
        .unwrap();

    assert_eq!(manifest_pns(&repo), vec!["00000002", "00000003", "00000001"]);
    let last: Compatibility = repo.compatibility().unwrap().pop().unwrap();
    assert_eq!(last.lrus.len(), 1);
    assert_eq!(last.lrus[0].name.as_deref(), Some("NEW"));
}

#[test]
fn test_failed_merge_leaves_manifest_untouched() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let before = std::fs::read(ctx.root.join("compatibility.xml")).unwrap();

    let bad = r#"<COMPATIBILITY><SOFTWARE PN="00000009"/><SOFTWARE/></COMPATIBILITY>"#;
    let err = repo.import(&ctx.write("bad.xml", bad.as_bytes())).unwrap_err();

    assert!(matches!(err, RepoError::MalformedManifest(_)));
    assert_eq!(
        std::fs::read(ctx.root.join("compatibility.xml")).unwrap(),
        before
    );
    assert_eq!(ctx.root_entries(), vec!["compatibility.xml"]);
}

#[test]
fn test_first_fragment_is_stored_without_merge_checks() {
    for (name, xml) in [
        ("empty.xml", "<COMPATIBILITY/>"),
        ("nopn.xml", "<COMPATIBILITY><SOFTWARE/></COMPATIBILITY>"),
    ] {
        let ctx = TestContext::new();
        let mut repo = ctx.open();
        let pn = repo.import(&ctx.write(name, xml.as_bytes())).unwrap();

        assert_eq!(pn, PartNumber::compatibility());
        assert!(repo.has_manifest());
        assert_eq!(
            std::fs::read(ctx.root.join("compatibility.xml")).unwrap(),
            xml.as_bytes()
        );
    }
}

#[test]
fn test_empty_fragment_is_rejected_by_merge() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let before = std::fs::read(ctx.root.join("compatibility.xml")).unwrap();

    let err = repo
        .import(&ctx.write("empty.xml", b"<COMPATIBILITY/>"))
        .unwrap_err();

    assert!(matches!(err, RepoError::MalformedManifest(_)));
    assert_eq!(
        std::fs::read(ctx.root.join("compatibility.xml")).unwrap(),
        before
    );
}

#[test]
fn test_filtered_manifest_matches_expected_output() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let before = std::fs::read(ctx.root.join("compatibility.xml")).unwrap();

    let path = repo.filtered_manifest_path(&["00000001"]).unwrap();

    assert_eq!(path, ctx.config().filtered_output);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), FILTERED_00000001);
    assert_eq!(
        std::fs::read(ctx.root.join("compatibility.xml")).unwrap(),
        before
    );
}

#[test]
fn test_filter_ignores_reserved_and_repeated_pns() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();

    let path = repo
        .filtered_manifest_path(&["00000001", "00000000", "00000000", "00000000"])
        .unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), FILTERED_00000001);
}

#[test]
fn test_filter_to_explicit_destination() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();

    let dest = ctx.inbox.join("custom").join("compat.xml");
    repo.write_filtered_manifest(&["00000001"], &dest).unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), FILTERED_00000001);
    assert!(!ctx.config().filtered_output.exists());
}

#[test]
fn test_filter_refuses_to_overwrite_stored_files() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let pn = repo.import(&ctx.load("l.bin", "00000001", b"one")).unwrap();
    let manifest = std::fs::read(ctx.root.join("compatibility.xml")).unwrap();
    let load = std::fs::read(ctx.root.join("00000001.bin")).unwrap();

    for dest in [ctx.root.join("compatibility.xml"), repo.path(&pn).unwrap()] {
        assert!(matches!(
            repo.write_filtered_manifest(&["00000001"], &dest).unwrap_err(),
            RepoError::StoredPath(p) if p == dest
        ));
    }

    assert_eq!(manifest_pns(&repo), vec!["00000001", "00000002"]);
    assert_eq!(
        std::fs::read(ctx.root.join("compatibility.xml")).unwrap(),
        manifest
    );
    assert_eq!(std::fs::read(ctx.root.join("00000001.bin")).unwrap(), load);
}

#[test]
fn test_filter_errors() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();

    assert!(matches!(
        repo.filtered_manifest_path(&["00000001"]).unwrap_err(),
        RepoError::NotFound(pn) if pn == PartNumber::compatibility()
    ));

    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let none: [&str; 0] = [];
    assert!(matches!(
        repo.filtered_manifest_path(&none).unwrap_err(),
        RepoError::EmptySelection
    ));
}

#[test]
fn test_concurrent_filter_requests_publish_whole_documents() {
    let ctx = TestContext::new();
    let mut repo = ctx.open();
    repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    let repo = &repo;

    std::thread::scope(|s| {
        for i in 0..8 {
            s.spawn(move || {
                let pn = if i % 2 == 0 { "00000001" } else { "00000002" };
                for _ in 0..10 {
                    let path = repo.filtered_manifest_path(&[pn]).unwrap();
                    let bytes = std::fs::read(path).unwrap();
                    swrepo_core::Document::parse(&bytes).unwrap();
                }
            });
        }
    });

    let out = std::fs::read(ctx.config().filtered_output).unwrap();
    let doc = swrepo_core::Document::parse(&out).unwrap();
    assert_eq!(Compatibility::collect(&doc).len(), 1);
}

#[test]
fn test_reopen_rebuilds_index_from_disk() {
    let ctx = TestContext::new();
    {
        let mut repo = ctx.open();
        repo.import(&ctx.load("1.bin", "00000001", b"one")).unwrap();
        repo.import(&ctx.load("2.bin", "00000002", b"two")).unwrap();
        repo.import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
            .unwrap();
        repo.filtered_manifest_path(&["00000002"]).unwrap();
    }
    std::fs::write(ctx.root.join("garbage.bin"), b"not a load").unwrap();

    let repo = ctx.open();

    assert_eq!(repo.list(), vec![pn_of("00000001"), pn_of("00000002")]);
    assert!(repo.has_manifest());
    assert_eq!(
        repo.path(&PartNumber::compatibility()).unwrap(),
        ctx.root.join("compatibility.xml")
    );
}

#[test]
fn test_custom_config_names() {
    let ctx = TestContext::new();
    let mut config = ctx.config();
    config.manifest_file = "compat.xml".to_string();
    config.reserved_pn = pn_of("FFFFFFFF");
    config.filtered_output = ctx.inbox.join("filtered.xml");

    let mut repo = Repository::open(config).unwrap();
    let pn = repo
        .import(&ctx.write("a.xml", FRAGMENT_A.as_bytes()))
        .unwrap();
    assert_eq!(pn, pn_of("FFFFFFFF"));
    assert!(ctx.root.join("compat.xml").exists());

    let out = repo.filtered_manifest_path(&["00000002"]).unwrap();
    assert_eq!(out, ctx.inbox.join("filtered.xml"));
    assert!(matches!(
        repo.remove(&pn_of("ffffffff")).unwrap_err(),
        RepoError::Protected(_)
    ));
}
