// Registry loading against real artifact files

use agrisense_models::{
    ArtifactLoadError, ModelId, ModelRegistry, Predictor, RegistryConfig,
};
use proptest::prelude::*;
use std::io::Write;
use std::path::PathBuf;

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../artifacts")
        .join(name)
}

fn bundled_config() -> RegistryConfig {
    RegistryConfig {
        classifier_path: bundled("crop_classifier.json"),
        fertilizer_path: bundled("fertilizer_recommender.json"),
    }
}

fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_initialize_loads_both_models() {
    let registry = ModelRegistry::initialize(&bundled_config()).unwrap();
    assert_eq!(registry.len(), 2);

    let classifier = registry.get(ModelId::Classifier).unwrap();
    assert_eq!(classifier.info().kind, "random_forest");
    assert_eq!(classifier.info().n_features, 7);

    let fertilizer = registry.get(ModelId::Fertilizer).unwrap();
    assert_eq!(fertilizer.info().kind, "decision_tree");
    assert_eq!(fertilizer.info().n_features, 5);
}

#[test]
fn test_crop_scenario_predicts_rice() {
    let registry = ModelRegistry::initialize(&bundled_config()).unwrap();
    let classifier = registry.get(ModelId::Classifier).unwrap();

    let prediction = classifier
        .predict(&[90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9])
        .unwrap();
    assert_eq!(prediction.label, "rice");
    assert!(prediction.confidence.unwrap() > 0.8);
}

#[test]
fn test_fertilizer_scenario_predicts_urea() {
    let registry = ModelRegistry::initialize(&bundled_config()).unwrap();
    let fertilizer = registry.get(ModelId::Fertilizer).unwrap();

    let prediction = fertilizer.predict(&[10.0, 10.0, 10.0, 1.0, 3.0]).unwrap();
    assert_eq!(prediction.label, "Urea");
    assert_eq!(prediction.confidence, Some(1.0));
}

#[test]
fn test_corrupted_artifact_fails_startup() {
    let corrupt = write_temp(b"\x80\x04\x95\x1a\x00\x00\x00sklearn.ensemble");
    let config = RegistryConfig {
        classifier_path: corrupt.path().to_path_buf(),
        ..bundled_config()
    };

    let err = ModelRegistry::initialize(&config).unwrap_err();
    assert!(matches!(err, ArtifactLoadError::Corrupted { .. }));
}

#[test]
fn test_swapped_artifacts_fail_startup() {
    let config = RegistryConfig {
        classifier_path: bundled("fertilizer_recommender.json"),
        fertilizer_path: bundled("crop_classifier.json"),
    };

    let err = ModelRegistry::initialize(&config).unwrap_err();
    assert!(matches!(
        err,
        ArtifactLoadError::WrongModel {
            expected: ModelId::Classifier,
            ..
        }
    ));
}

#[test]
fn test_truncated_artifact_fails_startup() {
    let full = std::fs::read(bundled("fertilizer_recommender.json")).unwrap();
    let truncated = write_temp(&full[..full.len() / 2]);
    let config = RegistryConfig {
        fertilizer_path: truncated.path().to_path_buf(),
        ..bundled_config()
    };

    assert!(ModelRegistry::initialize(&config).is_err());
}

proptest! {
    #[test]
    fn prop_classifier_is_deterministic(
        n in 0.0f64..140.0,
        p in 5.0f64..145.0,
        k in 5.0f64..205.0,
        temperature in 8.0f64..44.0,
        humidity in 14.0f64..100.0,
        ph in 3.5f64..10.0,
        rainfall in 20.0f64..300.0,
    ) {
        let registry = ModelRegistry::initialize(&bundled_config()).unwrap();
        let classifier = registry.get(ModelId::Classifier).unwrap();
        let x = [n, p, k, temperature, humidity, ph, rainfall];

        let first = classifier.predict(&x).unwrap();
        let second = classifier.predict(&x).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(classifier.info().classes.contains(&first.label));
    }
}
