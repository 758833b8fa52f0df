//! Scenario tests for the `Installer` use-cases.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use serde_json::json;

use shipctl::application::ports::{InstallLocker, RuntimePropertyStore};
use shipctl::domain::{HostPlatform, InstallerError, PackageKind};

use crate::mocks::{
    Sandbox, ScriptedRunner, StubDownloader, err_output, fake_managers, inputs, installer_error,
    syslog_inputs,
};

const DEB: &str = "filebeat_1.2.3_amd64.deb";

#[tokio::test]
async fn install_on_ubuntu_downloads_installs_and_configures() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"deb-bytes");

    let outcome = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .expect("install");

    assert_eq!(outcome.package.kind, PackageKind::Deb);
    assert_eq!(outcome.local_path, sandbox.install_path().join(DEB));
    assert_eq!(std::fs::read(&outcome.local_path).unwrap(), b"deb-bytes");
    assert!(runner.ran(&format!("dpkg -i {}", outcome.local_path.display())));

    let written = std::fs::read_to_string(sandbox.config_path()).expect("config written");
    let yaml: serde_yaml::Value = serde_yaml::from_str(&written).expect("valid yaml");
    assert_eq!(
        yaml["filebeat"]["prospectors"][0]["paths"][0].as_str(),
        Some("/var/log/syslog")
    );

    let props = sandbox.store.load_async().await.unwrap().expect("props saved");
    assert_eq!(props.install_path, Some(sandbox.install_path()));
    assert_eq!(props.config_path, Some(sandbox.config_path()));
    assert!(props.installed_at.is_some());
}

#[tokio::test]
async fn install_on_centos_uses_rpm() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"rpm");

    let outcome = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("centos"), &sandbox.request("centos", syslog_inputs()))
        .await
        .unwrap();

    assert_eq!(outcome.package.kind, PackageKind::Rpm);
    assert!(runner.ran("rpm -vi "));
    assert!(!runner.ran("dpkg"));
}

#[tokio::test]
async fn download_url_override_decides_package_kind() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"rpm");
    let mut request = sandbox.request("ubuntu", syslog_inputs());
    request.download_url = Some("https://mirror.local/beats/filebeat-1.3.0-x86_64.rpm".into());

    let outcome = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("ubuntu"), &request)
        .await
        .unwrap();

    assert_eq!(outcome.package.filename, "filebeat-1.3.0-x86_64.rpm");
    assert_eq!(downloader.urls(), ["https://mirror.local/beats/filebeat-1.3.0-x86_64.rpm"]);
    assert!(runner.ran("rpm -vi "));
}

#[tokio::test]
async fn unknown_distribution_is_unsupported_and_downloads_nothing() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");

    let err = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("arch"), &sandbox.request("arch", syslog_inputs()))
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::UnsupportedPlatform(_)));
    assert!(downloader.urls().is_empty());
    assert!(!runner.ran("dpkg") && !runner.ran("rpm"));
}

#[tokio::test]
async fn non_linux_host_fails_before_any_side_effect() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");
    let host = HostPlatform {
        os: "windows".into(),
        distribution_id: String::new(),
    };

    let err = sandbox
        .installer(&runner, &downloader)
        .install(&host, &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::UnsupportedPlatform(_)));
    assert!(runner.lines().is_empty());
    assert!(sandbox.store.load_async().await.unwrap().is_none());
}

#[tokio::test]
async fn install_path_that_is_a_file_is_a_conflict() {
    let sandbox = Sandbox::new();
    let install_path = sandbox.install_path();
    std::fs::create_dir_all(install_path.parent().unwrap()).unwrap();
    std::fs::write(&install_path, b"not a directory").unwrap();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");

    let err = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::PathConflict(_)));
    assert!(downloader.urls().is_empty());
}

#[tokio::test]
async fn concurrent_install_on_same_path_is_rejected() {
    let sandbox = Sandbox::new();
    let _held = sandbox.locker.acquire(&sandbox.install_path()).unwrap();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");

    let err = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::InstallInProgress { .. }));
    assert!(runner.lines().is_empty());
}

#[tokio::test]
async fn failed_download_stops_before_package_install() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();

    let err = sandbox
        .installer(&runner, &StubDownloader::failing())
        .install(&HostPlatform::linux("debian"), &sandbox.request("debian", syslog_inputs()))
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::DownloadError(_)));
    assert!(!runner.ran("dpkg"));
    assert!(!sandbox.config_path().exists());
}

#[tokio::test]
async fn package_manager_failure_is_command_failure_and_skips_configure() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new().fake("dpkg", err_output(2, b"dpkg: error processing archive"));
    let downloader = StubDownloader::serving(b"deb");

    let err = sandbox
        .installer(&runner, &downloader)
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap_err();

    let result = installer_error(&err).command_result().expect("command result");
    assert_eq!(result.exit_code, 2);
    assert!(result.stderr_lossy().contains("error processing archive"));
    assert!(!sandbox.config_path().exists());
    assert!(
        sandbox.install_path().join(DEB).exists(),
        "earlier steps are not rolled back"
    );
}

#[tokio::test]
async fn repeated_install_writes_identical_config() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"deb");
    let request = sandbox.request(
        "ubuntu",
        inputs(json!({
            "paths": {"syslog": ["/var/log/syslog"], "auth": ["/var/log/auth.log"]},
            "outputs": {"logstash": {"hosts": ["10.0.0.5:5044"]}},
        })),
    );
    let installer = sandbox.installer(&runner, &downloader);

    installer.install(&HostPlatform::linux("ubuntu"), &request).await.unwrap();
    let first = std::fs::read(sandbox.config_path()).unwrap();
    installer.install(&HostPlatform::linux("ubuntu"), &request).await.unwrap();
    let second = std::fs::read(sandbox.config_path()).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn configure_with_bad_template_keeps_previous_config() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"deb");
    let installer = sandbox.installer(&runner, &downloader);
    installer
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap();
    let before = std::fs::read(sandbox.config_path()).unwrap();

    let template = sandbox.dir.path().join("custom.yml");
    std::fs::write(&template, "shipper: {{ shipper_name }}\n").unwrap();
    let err = installer
        .configure(Some(&template.to_string_lossy()), &syslog_inputs())
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::TemplateRenderError(_)));
    assert_eq!(std::fs::read(sandbox.config_path()).unwrap(), before);
}

#[tokio::test]
async fn configure_renders_user_template() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");
    let template = sandbox.dir.path().join("custom.yml");
    std::fs::write(&template, "shipper:\n  name: {{ name | json_encode() }}\n").unwrap();

    let rendered = sandbox
        .installer(&runner, &downloader)
        .configure(Some(&template.to_string_lossy()), &inputs(json!({"name": "edge-1"})))
        .await
        .unwrap();

    assert_eq!(rendered.destination_path, sandbox.config_path());
    assert_eq!(
        std::fs::read_to_string(sandbox.config_path()).unwrap(),
        "shipper:\n  name: \"edge-1\"\n"
    );
    assert!(downloader.urls().is_empty());
}

#[tokio::test]
async fn start_without_config_fails_before_service_manager() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"");

    let err = sandbox
        .installer(&runner, &downloader)
        .start(&fake_managers())
        .await
        .unwrap_err();

    assert!(matches!(installer_error(&err), InstallerError::MissingConfig(_)));
    assert!(runner.lines().is_empty());
}

#[tokio::test]
async fn start_after_install_uses_primary_manager() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new();
    let downloader = StubDownloader::serving(b"deb");
    let installer = sandbox.installer(&runner, &downloader);
    installer
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap();

    let result = installer.start(&fake_managers()).await.unwrap();

    assert!(result.success());
    assert_eq!(runner.lines().last().unwrap(), "modern start filebeat");
    assert!(!runner.ran("legacy"));
}

#[tokio::test]
async fn failing_primary_manager_falls_back_to_legacy_restart() {
    let sandbox = Sandbox::new();
    let runner = ScriptedRunner::new().fake("modern", err_output(5, b"Unit not found"));
    let downloader = StubDownloader::serving(b"deb");
    let installer = sandbox.installer(&runner, &downloader);
    installer
        .install(&HostPlatform::linux("ubuntu"), &sandbox.request("ubuntu", syslog_inputs()))
        .await
        .unwrap();

    installer.start(&fake_managers()).await.unwrap();

    let lines = runner.lines();
    assert_eq!(
        &lines[lines.len() - 2..],
        ["modern start filebeat", "legacy restart filebeat"]
    );
}
