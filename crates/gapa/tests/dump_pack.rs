//! Dump and pack through real directories.

use std::fs;
use std::path::Path;

use gapa::jpac::{BlockKind, OpaqueBlock};
use gapa::prelude::*;
use gapa::Summary;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn resource(textures: &[&str], fill: u8) -> JpaResource {
    JpaResource {
        dynamics: vec![fill; 12],
        field_blocks: vec![vec![fill + 1; 8]],
        key_blocks: vec![vec![fill + 2; 4], vec![fill + 3; 4]],
        base_shape: vec![fill + 4; 8],
        extra_shape: vec![fill + 5; 4],
        child_shape: Some(vec![fill + 6; 4]),
        ex_tex_shape: None,
        extra_blocks: vec![],
        textures: textures.iter().map(|s| s.to_string()).collect(),
    }
}

fn sample() -> ParticleData {
    let mut container = ParticleContainer::new();
    container.insert_texture(JpaTexture::new("mr_glow01", vec![0xA0; 64])).unwrap();
    container.insert_texture(JpaTexture::new("mr_smoke", vec![0xB0; 32])).unwrap();

    let mut spark = resource(&["mr_glow01"], 0x10);
    spark
        .extra_blocks
        .push(OpaqueBlock::new(BlockKind::from_tag(*b"ZZZ1"), vec![9; 4]));

    container.insert_particle("Spark", spark).unwrap();
    container.insert_particle("Dust", resource(&["mr_smoke", "mr_glow01"], 0x20)).unwrap();
    container.insert_particle("Blank", resource(&[], 0x30)).unwrap();

    let mut death = EffectEntry::new("Kuribo", "Death");
    death.effect_name = vec!["Dust".to_string()];
    death.end_frame = 30;

    ParticleData {
        container,
        effects: vec![death, EffectEntry::new("Bomb", "Explode")],
    }
}

fn write_binary(dir: &Path) -> BinaryFiles {
    let files = sample().to_binary().unwrap();
    files.write(dir, &Layout::default()).unwrap();
    files
}

fn read(path: impl AsRef<Path>) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[test]
fn test_dump_then_pack_is_byte_identical() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();
    let original = write_binary(binary.path());

    gapa::dump(binary.path(), text.path(), &layout).unwrap();
    gapa::pack(text.path(), packed.path(), &layout).unwrap();

    assert_eq!(read(packed.path().join("Particles.jpc")), original.container);
    assert_eq!(read(packed.path().join("ParticleNames.bcsv")), original.particle_names);
    assert_eq!(read(packed.path().join("AutoEffectList.bcsv")), original.effect_list);
}

#[test]
fn test_dump_tree() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());

    gapa::dump(binary.path(), text.path(), &layout).unwrap();

    let summary: Summary =
        serde_json::from_slice(&read(text.path().join("Particles.json"))).unwrap();
    assert_eq!(summary.particles, vec!["Spark", "Dust", "Blank"]);
    assert_eq!(summary.textures, vec!["mr_glow01", "mr_smoke"]);

    assert_eq!(read(text.path().join("Textures").join("mr_smoke.bti")), vec![0xB0; 32]);

    let spark: serde_json::Value =
        serde_json::from_slice(&read(text.path().join("Particles").join("Spark.json"))).unwrap();
    assert_eq!(spark["dynamicsBlock"], serde_json::json!("10".repeat(12)));
    assert_eq!(spark["textures"], serde_json::json!(["mr_glow01"]));
    assert_eq!(
        spark["extraBlocks"],
        serde_json::json!([{"kind": "ZZZ1", "data": "09090909"}])
    );
    assert!(spark.get("exTexShape").is_none());

    let effects: serde_json::Value =
        serde_json::from_slice(&read(text.path().join("Effects.json"))).unwrap();
    assert_eq!(
        effects,
        serde_json::json!([
            {"GroupName": "Kuribo", "UniqueName": "Death", "EffectName": ["Dust"], "EndFrame": 30},
            {"GroupName": "Bomb", "UniqueName": "Explode"},
        ])
    );
}

#[test]
fn test_pack_minimal_tree() {
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();

    fs::create_dir_all(text.path().join("Particles")).unwrap();
    fs::write(
        text.path().join("Particles.json"),
        r#"{"particles": ["Dust"], "textures": []}"#,
    )
    .unwrap();
    fs::write(
        text.path().join("Particles").join("Dust.json"),
        r#"{"dynamicsBlock": "00000000", "baseShape": "11111111", "extraShape": "22222222"}"#,
    )
    .unwrap();
    fs::write(
        text.path().join("Effects.json"),
        r#"[{"GroupName": "Kuribo", "UniqueName": "Death"}]"#,
    )
    .unwrap();

    gapa::pack(text.path(), packed.path(), &layout).unwrap();

    let effects = JMapInfo::parse(&read(packed.path().join("AutoEffectList.bcsv"))).unwrap();
    assert_eq!(effects.get_int(0, "No"), Some(0));
    assert_eq!(effects.get_str(0, "GroupName"), Some("Kuribo"));
    assert_eq!(effects.get_int(0, "EndFrame"), Some(-1));
    assert_eq!(effects.get_float(0, "ScaleValue"), Some(1.0));
    assert_eq!(effects.get_str(0, "DrawOrder"), Some("3D"));

    let data = ParticleData::from_binary_dir(packed.path(), &layout).unwrap();
    let dust = data.container.particle("Dust").unwrap();
    assert!(dust.field_blocks.is_empty());
    assert!(dust.key_blocks.is_empty());
    assert_eq!(dust.base_shape, vec![0x11; 4]);
}

#[test]
fn test_pack_missing_texture_writes_nothing() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());
    gapa::dump(binary.path(), text.path(), &layout).unwrap();

    let summary = Summary {
        particles: vec!["Spark".to_string(), "Dust".to_string(), "Blank".to_string()],
        textures: vec!["mr_glow01".to_string()],
    };
    fs::write(
        text.path().join("Particles.json"),
        serde_json::to_vec(&summary).unwrap(),
    )
    .unwrap();

    let err = gapa::pack(text.path(), packed.path(), &layout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.to_string().contains("mr_smoke"));
    assert_eq!(fs::read_dir(packed.path()).unwrap().count(), 0);
}

#[test]
fn test_pack_missing_required_block() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());
    gapa::dump(binary.path(), text.path(), &layout).unwrap();

    let path = text.path().join("Particles").join("Blank.json");
    let mut document: serde_json::Value = serde_json::from_slice(&read(&path)).unwrap();
    document.as_object_mut().unwrap().remove("baseShape");
    fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

    let err = gapa::pack(text.path(), packed.path(), &layout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Blank"));
    assert_eq!(fs::read_dir(packed.path()).unwrap().count(), 0);
}

#[test]
fn test_pack_malformed_json() {
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    fs::write(text.path().join("Particles.json"), "{ not json").unwrap();

    let err = gapa::pack(text.path(), packed.path(), &Layout::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_dump_missing_file() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();

    let err = gapa::dump(binary.path(), text.path(), &Layout::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("Particles.jpc"));
}

#[test]
fn test_dump_corrupt_container() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());
    fs::write(binary.path().join("Particles.jpc"), b"JPAC1-00\0\0\0\0\0\0\0\0").unwrap();

    let err = gapa::dump(binary.path(), text.path(), &layout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(fs::read_dir(text.path()).unwrap().count(), 0);
}

#[test]
fn test_pack_listed_file_missing() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());
    gapa::dump(binary.path(), text.path(), &layout).unwrap();

    let summary = |particles: &[&str], textures: &[&str]| Summary {
        particles: particles.iter().map(|s| s.to_string()).collect(),
        textures: textures.iter().map(|s| s.to_string()).collect(),
    };

    for (listed, missing) in [
        (summary(&["Spark", "Ghost"], &["mr_glow01"]), "Ghost"),
        (summary(&["Spark"], &["mr_glow01", "gone"]), "gone"),
    ] {
        fs::write(text.path().join("Particles.json"), serde_json::to_vec(&listed).unwrap()).unwrap();

        let err = gapa::pack(text.path(), packed.path(), &layout).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert!(err.to_string().contains(missing));
        assert_eq!(fs::read_dir(packed.path()).unwrap().count(), 0);
    }
}

#[test]
fn test_dump_rejects_escaping_names() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let layout = Layout::default();

    let mut data = sample();
    data.container.insert_particle("../escaped", resource(&[], 0x40)).unwrap();
    data.to_binary().unwrap().write(binary.path(), &layout).unwrap();

    let dst = text.path().join("dump");
    let err = gapa::dump(binary.path(), &dst, &layout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("../escaped"));
    assert!(!dst.exists());
    assert_eq!(fs::read_dir(text.path()).unwrap().count(), 0);
}

#[test]
fn test_pack_rejects_escaping_names() {
    let binary = TempDir::new().unwrap();
    let text = TempDir::new().unwrap();
    let packed = TempDir::new().unwrap();
    let layout = Layout::default();
    write_binary(binary.path());
    gapa::dump(binary.path(), text.path(), &layout).unwrap();

    let summary = Summary {
        particles: vec!["Spark".to_string(), "../Dust".to_string()],
        textures: vec!["mr_glow01".to_string(), "mr_smoke".to_string()],
    };
    fs::write(text.path().join("Particles.json"), serde_json::to_vec(&summary).unwrap()).unwrap();

    let err = gapa::pack(text.path(), packed.path(), &layout).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("../Dust"));
    assert_eq!(fs::read_dir(packed.path()).unwrap().count(), 0);
}
