use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PixcompError::contract("x")
            .to_string()
            .contains("contract violation:")
    );
    assert!(
        PixcompError::resource("x")
            .to_string()
            .contains("resource exhausted:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PixcompError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
