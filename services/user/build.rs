use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/user.proto");
    println!("cargo:rerun-if-env-changed=PROTOC");

    // Fall back to the bundled protoc when none is configured.
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    let includes = [
        PathBuf::from("proto"),
        protoc_bin_vendored::include_path()?,
    ];

    // google.protobuf.Empty maps to `()`
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/user.proto"], &includes)?;

    Ok(())
}
