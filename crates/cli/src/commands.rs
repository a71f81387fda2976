use anyhow::{Context, Result, bail};
use futures_util::future::join_all;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use vcn_registry_client::{ArtifactResponse, RegistryClient, Status, Visibility};

use crate::artifact::LocalArtifact;
use crate::context::AppContext;

/// Verbs that submit a new trust verdict for an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteVerb {
    Sign,
    Untrust,
    Unsupport,
}

impl WriteVerb {
    pub fn name(self) -> &'static str {
        match self {
            WriteVerb::Sign => "sign",
            WriteVerb::Untrust => "untrust",
            WriteVerb::Unsupport => "unsupport",
        }
    }

    /// The verdict each verb submits.
    pub fn status(self) -> Status {
        match self {
            WriteVerb::Sign => Status::Trusted,
            WriteVerb::Untrust => Status::Untrusted,
            WriteVerb::Unsupport => Status::Unsupported,
        }
    }
}

/// Flags shared by the write verbs.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub public: bool,
    /// Proceed without waiting for the user. On by default for automation.
    pub quit: bool,
    /// The user acknowledged up front (`--yes`).
    pub acknowledge: bool,
}

/// A write only prompts when nothing already allows it to proceed.
pub fn needs_confirmation(acknowledge: bool, quit: bool) -> bool {
    !acknowledge && !quit
}

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&self, question: &str) -> Result<bool>;
}

pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, question: &str) -> Result<bool> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{question} [y/N]: ").context("failed to write prompt")?;
        stderr.flush().context("failed to write prompt")?;

        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("failed to read answer")?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub async fn write(
    client: &RegistryClient,
    verb: WriteVerb,
    reference: Option<&str>,
    opts: &WriteOptions,
    confirm: &dyn Confirm,
) -> Result<ExitCode> {
    let Some(reference) = reference else {
        bail!("filename or type:reference required");
    };
    tracing::debug!(verb = verb.name(), reference, "executing write command");

    let artifact = LocalArtifact::resolve(reference)?;
    let visibility = Visibility::for_flag(opts.public);
    let status = verb.status();
    let file_size = i64::try_from(artifact.size)
        .with_context(|| format!("{} is too large", artifact.path.display()))?;

    if needs_confirmation(opts.acknowledge, opts.quit) {
        let question = format!(
            "{} {} ({}) as {status} with {visibility} visibility?",
            verb.name(),
            artifact.name,
            artifact.hash
        );
        if !confirm.confirm(&question)? {
            eprintln!("Aborted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    client
        .submit_for_current_wallet(
            &artifact.name,
            &artifact.hash,
            file_size,
            visibility,
            status,
        )
        .await
        .with_context(|| format!("failed to {} {reference}", verb.name()))?;

    println!("File:\t{}", artifact.name);
    println!("Hash:\t{}", artifact.hash);
    println!("Status:\t{status}");
    println!("Visibility:\t{visibility}");
    Ok(ExitCode::SUCCESS)
}

/// Result of verifying one asset.
#[derive(Debug)]
pub struct Verification {
    pub asset: String,
    pub result: Result<Option<ArtifactResponse>>,
}

impl Verification {
    pub fn is_trusted(&self) -> bool {
        matches!(&self.result, Ok(Some(artifact)) if artifact.is_trusted())
    }
}

/// Verify every asset concurrently. Results come back in input order.
pub async fn verify_all(
    client: &RegistryClient,
    assets: &[String],
    by_hash: bool,
) -> Vec<Verification> {
    join_all(assets.iter().map(|asset| async move {
        let result = verify_one(client, asset, by_hash)
            .await
            .with_context(|| format!("failed to verify {asset}"));
        Verification {
            asset: asset.clone(),
            result,
        }
    }))
    .await
}

async fn verify_one(
    client: &RegistryClient,
    asset: &str,
    by_hash: bool,
) -> Result<Option<ArtifactResponse>> {
    let hash = if by_hash {
        asset.trim().to_ascii_lowercase()
    } else {
        LocalArtifact::resolve(asset)?.hash
    };
    Ok(client.lookup_content_hash(&hash).await?)
}

pub async fn verify(ctx: &AppContext, assets: &[String], by_hash: bool) -> Result<ExitCode> {
    if assets.is_empty() {
        bail!("assets required");
    }
    tracing::debug!(count = assets.len(), "executing verify command");

    let results = verify_all(&ctx.client, assets, by_hash).await;
    let all_trusted = results.iter().all(Verification::is_trusted);

    for v in &results {
        match &v.result {
            Ok(Some(artifact)) => print!("{}", describe(artifact)),
            Ok(None) => println!("{}: not found\n", v.asset),
            Err(e) => {
                tracing::debug!(asset = %v.asset, "verification failed");
                eprintln!("error: {e:#}\n");
            }
        }
    }

    Ok(if all_trusted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn describe(artifact: &ArtifactResponse) -> String {
    let mut out = format!(
        "File:\t{}\nHash:\t{}\nStatus:\t{}\n",
        artifact.name, artifact.hash, artifact.status
    );
    if !artifact.publisher.is_empty() {
        out.push_str(&format!("Publisher:\t{}\n", artifact.publisher));
    }
    out.push_str(&format!("Level:\t{}\n", artifact.level()));
    out.push_str(&format!(
        "Verifications:\t{}\nConflicts:\t{}\n\n",
        artifact.count_verifications, artifact.count_conflicts
    ));
    out
}

pub async fn list(ctx: &AppContext) -> Result<ExitCode> {
    tracing::debug!("executing list command");

    let artifacts = ctx
        .client
        .list_for_current_wallet()
        .await
        .context("failed to list artifacts")?;

    if artifacts.is_empty() {
        println!("No artifacts found.");
    } else {
        println!("Artifacts:");
        for artifact in &artifacts {
            print!("{artifact}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn login(ctx: &AppContext, token: Option<String>) -> Result<ExitCode> {
    let token = match token {
        Some(token) => token,
        None => {
            eprint!("Token: ");
            std::io::stderr().flush().context("failed to write prompt")?;
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read token")?;
            line
        }
    };

    ctx.session.store_token(&token)?;
    eprintln!("Login successful.");
    Ok(ExitCode::SUCCESS)
}

pub fn dashboard(ctx: &AppContext) -> Result<ExitCode> {
    let url = ctx.config.stage.dashboard_url();
    println!("{url}");

    if let Err(e) = open_browser(url) {
        tracing::warn!("could not open browser: {e:#}");
    }
    Ok(ExitCode::SUCCESS)
}

fn open_browser(url: &str) -> Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        std::process::Command::new("xdg-open")
    };

    let status = cmd
        .arg(url)
        .status()
        .context("failed to launch browser")?;
    if !status.success() {
        bail!("browser launcher exited with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};
    use vcn_registry_client::{AuthContext, ClientConfig, RegistryError, Sha256MetaHasher};

    /// Nobody is signed in. Counts how often the token was asked for.
    #[derive(Default)]
    struct SignedOut {
        token_loads: AtomicUsize,
    }

    impl AuthContext for SignedOut {
        fn load_token(&self) -> Result<String> {
            self.token_loads.fetch_add(1, Ordering::SeqCst);
            bail!("no valid session")
        }

        fn public_key_for_local_wallet(&self) -> Result<String> {
            bail!("no wallet found")
        }
    }

    struct ScriptedConfirm {
        answer: bool,
        asked: Cell<usize>,
    }

    impl ScriptedConfirm {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                asked: Cell::new(0),
            }
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm(&self, _question: &str) -> Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.answer)
        }
    }

    fn offline_client(session: Arc<SignedOut>) -> RegistryClient {
        let config = ClientConfig::with_base_url("http://127.0.0.1:1").unwrap();
        RegistryClient::new(&config, session, Arc::new(Sha256MetaHasher)).unwrap()
    }

    fn temp_artifact(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before UNIX_EPOCH")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "vcn-write-{prefix}-{}-{nanos}.bin",
            std::process::id()
        ));
        std::fs::write(&path, b"release bits").unwrap();
        path
    }

    fn interactive() -> WriteOptions {
        WriteOptions {
            public: false,
            quit: false,
            acknowledge: false,
        }
    }

    #[tokio::test]
    async fn declined_confirmation_submits_nothing() {
        let file = temp_artifact("declined");
        let session = Arc::new(SignedOut::default());
        let client = offline_client(session.clone());
        let confirm = ScriptedConfirm::answering(false);

        let code = write(
            &client,
            WriteVerb::Sign,
            file.to_str(),
            &interactive(),
            &confirm,
        )
        .await
        .unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(confirm.asked.get(), 1);
        assert_eq!(session.token_loads.load(Ordering::SeqCst), 0);
        let _ = std::fs::remove_file(&file);
    }

    #[tokio::test]
    async fn accepted_confirmation_proceeds_to_submit() {
        let file = temp_artifact("accepted");
        let session = Arc::new(SignedOut::default());
        let client = offline_client(session.clone());
        let confirm = ScriptedConfirm::answering(true);

        let err = write(
            &client,
            WriteVerb::Untrust,
            file.to_str(),
            &interactive(),
            &confirm,
        )
        .await
        .unwrap_err();

        assert_eq!(confirm.asked.get(), 1);
        assert_eq!(session.token_loads.load(Ordering::SeqCst), 1);
        let registry_err = err.downcast_ref::<RegistryError>().expect("registry error");
        assert!(registry_err.is_auth_missing(), "{err:#}");
        let _ = std::fs::remove_file(&file);
    }

    #[tokio::test]
    async fn quit_skips_the_prompt() {
        let file = temp_artifact("quit");
        let session = Arc::new(SignedOut::default());
        let client = offline_client(session.clone());
        let confirm = ScriptedConfirm::answering(false);
        let opts = WriteOptions {
            quit: true,
            ..interactive()
        };

        let err = write(&client, WriteVerb::Sign, file.to_str(), &opts, &confirm)
            .await
            .unwrap_err();

        assert_eq!(confirm.asked.get(), 0);
        assert_eq!(session.token_loads.load(Ordering::SeqCst), 1);
        assert!(err.to_string().contains("failed to sign"), "{err:#}");
        let _ = std::fs::remove_file(&file);
    }

    #[test]
    fn write_verbs_map_to_fixed_statuses() {
        assert_eq!(WriteVerb::Sign.status(), Status::Trusted);
        assert_eq!(WriteVerb::Untrust.status(), Status::Untrusted);
        assert_eq!(WriteVerb::Unsupport.status(), Status::Unsupported);
    }

    #[test]
    fn confirmation_only_when_neither_flag_allows_it() {
        assert!(needs_confirmation(false, false));
        assert!(!needs_confirmation(true, false));
        assert!(!needs_confirmation(false, true));
        assert!(!needs_confirmation(true, true));
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn describe_includes_level_and_counts() {
        let artifact = ArtifactResponse {
            name: "app".into(),
            hash: "ff".into(),
            status: "TRUSTED".into(),
            publisher: "dev@example.com".into(),
            level: 99,
            count_verifications: 4,
            count_conflicts: 1,
            ..Default::default()
        };
        let text = describe(&artifact);
        assert!(text.starts_with("File:\tapp\nHash:\tff\nStatus:\tTRUSTED\n"));
        assert!(text.contains("Publisher:\tdev@example.com\n"));
        assert!(text.contains("Level:\tVCHAIN\n"));
        assert!(text.contains("Verifications:\t4\nConflicts:\t1\n"));
    }

    #[test]
    fn verification_trust_requires_trusted_artifact() {
        let trusted = Verification {
            asset: "a".into(),
            result: Ok(Some(ArtifactResponse {
                status: "TRUSTED".into(),
                ..Default::default()
            })),
        };
        let missing = Verification {
            asset: "b".into(),
            result: Ok(None),
        };
        assert!(trusted.is_trusted());
        assert!(!missing.is_trusted());
    }
}
