//! First-Boot Bootstrap Sequencing
//!
//! Computes the ordered command sequence the instance runs on first boot.
//! Ordering is a hard invariant: dependencies install before the payload is
//! fetched, the payload unpacks before it executes, and the entrypoint
//! receives the storage resource identity as its sole argument so it can
//! mount the save volume before launching the server. The sequence is an
//! immutable list of typed steps, not accumulated shell text, so the
//! invariant is checkable structurally.

use hostkit_common::ResourceName;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Location of the externally packaged install payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLocator {
    /// Bucket or store holding the payload.
    pub bucket: String,
    /// Object key of the payload archive.
    pub key: String,
}

impl PayloadLocator {
    /// Create a locator.
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }
}

/// What an install step puts on the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallTarget {
    /// OS packages for archive extraction and network file-system mounting.
    OsPackages(Vec<String>),
    /// Provider command-line client, needed to fetch the payload and to run
    /// backups later.
    ProviderCli {
        /// Architecture-matched client download location.
        download_url: String,
    },
}

/// One ordered unit of first-boot work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootstrapStep {
    /// Install a dependency on the instance.
    Install(InstallTarget),
    /// Fetch the packaged install payload to local storage.
    FetchPayload {
        /// Payload location. The instance role needs read access to it.
        source: PayloadLocator,
        /// Local path the archive lands at.
        destination: String,
    },
    /// Unpack the payload and mark the entrypoint executable.
    Unpack {
        /// Local archive path.
        archive: String,
        /// Entrypoint to mark executable.
        entrypoint: String,
    },
    /// Execute the entrypoint with arguments.
    Execute {
        /// Entrypoint path.
        entrypoint: String,
        /// Positional arguments.
        args: Vec<String>,
    },
}

/// Immutable, ordered first-boot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapSequence {
    steps: Vec<BootstrapStep>,
}

impl BootstrapSequence {
    /// The ordered steps.
    pub fn steps(&self) -> &[BootstrapStep] {
        &self.steps
    }

    /// Content fingerprint of the sequence. Any change to any step changes
    /// the fingerprint, which forces instance replacement downstream.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(&self.steps).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        hex::encode(digest)
    }

    /// Check the structural ordering invariant.
    pub fn verify_order(&self) -> Result<(), SequenceError> {
        if self.steps.len() != STEP_COUNT {
            return Err(SequenceError::WrongLength(self.steps.len()));
        }
        let mut last_install = None;
        let mut first_fetch = None;
        let mut first_unpack = None;
        let mut first_execute = None;
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                BootstrapStep::Install(_) => last_install = Some(i),
                BootstrapStep::FetchPayload { .. } => {
                    first_fetch.get_or_insert(i);
                }
                BootstrapStep::Unpack { .. } => {
                    first_unpack.get_or_insert(i);
                }
                BootstrapStep::Execute { .. } => {
                    first_execute.get_or_insert(i);
                }
            }
        }
        let (fetch, unpack, execute) = match (first_fetch, first_unpack, first_execute) {
            (Some(f), Some(u), Some(e)) => (f, u, e),
            _ => return Err(SequenceError::MissingStage),
        };
        let install = last_install.ok_or(SequenceError::MissingStage)?;
        if install > fetch {
            return Err(SequenceError::OutOfOrder("install must precede fetch"));
        }
        if fetch > unpack {
            return Err(SequenceError::OutOfOrder("fetch must precede unpack"));
        }
        if unpack > execute {
            return Err(SequenceError::OutOfOrder("unpack must precede execute"));
        }
        Ok(())
    }
}

/// Number of steps in every first-boot sequence.
pub const STEP_COUNT: usize = 5;

const PAYLOAD_LOCAL_PATH: &str = "/tmp/install.zip";
const ENTRYPOINT_PATH: &str = "/install.sh";
const PROVIDER_CLI_URL: &str = "https://awscli.amazonaws.com/awscli-exe-linux-aarch64.zip";

/// Computes the first-boot sequence for a deployment.
pub struct BootstrapSequencer;

impl BootstrapSequencer {
    /// Produce the fixed five-step sequence. The storage name is the sole
    /// execute argument; the entrypoint mounts it and launches the server.
    pub fn sequence(payload: &PayloadLocator, storage: &ResourceName) -> BootstrapSequence {
        let steps = vec![
            BootstrapStep::Install(InstallTarget::OsPackages(vec![
                "unzip".into(),
                "amazon-efs-utils".into(),
            ])),
            BootstrapStep::Install(InstallTarget::ProviderCli {
                download_url: PROVIDER_CLI_URL.into(),
            }),
            BootstrapStep::FetchPayload {
                source: payload.clone(),
                destination: PAYLOAD_LOCAL_PATH.into(),
            },
            BootstrapStep::Unpack {
                archive: PAYLOAD_LOCAL_PATH.into(),
                entrypoint: ENTRYPOINT_PATH.into(),
            },
            BootstrapStep::Execute {
                entrypoint: ENTRYPOINT_PATH.into(),
                args: vec![storage.as_str().to_string()],
            },
        ];
        BootstrapSequence { steps }
    }
}

/// Sequence invariant violations
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("sequence has {0} steps, expected 5")]
    WrongLength(usize),
    #[error("sequence is missing a stage")]
    MissingStage,
    #[error("sequence out of order: {0}")]
    OutOfOrder(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> PayloadLocator {
        PayloadLocator::new("assets-bucket", "install/payload.zip")
    }

    fn storage() -> ResourceName {
        ResourceName::scoped("Game", "SaveData")
    }

    #[test]
    fn test_sequence_is_exactly_five_steps_in_order() {
        let seq = BootstrapSequencer::sequence(&payload(), &storage());
        assert_eq!(seq.steps().len(), STEP_COUNT);
        assert!(seq.verify_order().is_ok());

        assert!(matches!(
            seq.steps()[0],
            BootstrapStep::Install(InstallTarget::OsPackages(_))
        ));
        assert!(matches!(
            seq.steps()[1],
            BootstrapStep::Install(InstallTarget::ProviderCli { .. })
        ));
        assert!(matches!(seq.steps()[2], BootstrapStep::FetchPayload { .. }));
        assert!(matches!(seq.steps()[3], BootstrapStep::Unpack { .. }));
        assert!(matches!(seq.steps()[4], BootstrapStep::Execute { .. }));
    }

    #[test]
    fn test_execute_receives_storage_name_as_sole_argument() {
        let seq = BootstrapSequencer::sequence(&payload(), &storage());
        match &seq.steps()[4] {
            BootstrapStep::Execute { args, .. } => {
                assert_eq!(args, &vec![storage().as_str().to_string()]);
            }
            other => panic!("expected execute step, got {other:?}"),
        }
    }

    #[test]
    fn test_fingerprint_changes_with_payload() {
        let a = BootstrapSequencer::sequence(&payload(), &storage());
        let b = BootstrapSequencer::sequence(
            &PayloadLocator::new("assets-bucket", "install/payload-v2.zip"),
            &storage(),
        );
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_is_stable_for_same_inputs() {
        let a = BootstrapSequencer::sequence(&payload(), &storage());
        let b = BootstrapSequencer::sequence(&payload(), &storage());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_out_of_order_sequence_is_rejected() {
        let good = BootstrapSequencer::sequence(&payload(), &storage());
        let mut steps: Vec<_> = good.steps().to_vec();
        steps.swap(3, 4); // execute before unpack
        let bad = BootstrapSequence { steps };
        assert!(matches!(
            bad.verify_order(),
            Err(SequenceError::OutOfOrder(_))
        ));
    }

    #[test]
    fn test_truncated_sequence_is_rejected() {
        let good = BootstrapSequencer::sequence(&payload(), &storage());
        let bad = BootstrapSequence {
            steps: good.steps()[..4].to_vec(),
        };
        assert!(matches!(
            bad.verify_order(),
            Err(SequenceError::WrongLength(4))
        ));
    }
}
