//! Package lifecycle
//!
//! A [`Package`] is created by resolving a configured name to a directory,
//! which for remote packages means checking out the tracked branch. After
//! that [`Package::install`] and [`Package::build`] run only when the
//! timestamps in the [`Cache`] show that something changed since the last
//! successful run. The cache is written only after an action succeeds.
//!
//! What installing and building mean depends on the package kind and is
//! delegated to a [`PackageStrategy`].

pub mod editable;
pub mod link;
pub mod strategy;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::cache::Cache;
use crate::config::{PackageDescriptor, PackageSource, SyncConfig};
use crate::error::{self, Result};
use crate::exec::{Toolchain, display_command};
use crate::git::{CheckoutOutcome, CloneUrlResolver, RepositoryBinding, RepositorySynchronizer};

pub use strategy::{PackageStrategy, strategy_for};

/// Whether a gated step did its work or found it up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Ran,
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ran => write!(f, "ran"),
            Self::Skipped => write!(f, "up to date"),
        }
    }
}

/// Everything a package needs from the outside during one run
pub struct SyncContext<'a> {
    pub config: &'a SyncConfig,
    pub cache: &'a Cache,
    pub resolver: &'a dyn CloneUrlResolver,
    pub toolchain: Toolchain,
}

impl<'a> SyncContext<'a> {
    pub fn new(config: &'a SyncConfig, cache: &'a Cache, resolver: &'a dyn CloneUrlResolver) -> Self {
        Self {
            config,
            cache,
            resolver,
            toolchain: Toolchain::new(
                config.npm.clone(),
                config.python.clone(),
                config.command_timeout(),
            ),
        }
    }

    fn synchronizer(&self) -> RepositorySynchronizer<'a> {
        RepositorySynchronizer::new(self.resolver)
            .with_token(self.config.github_token())
            .with_network_timeout(self.config.network_timeout())
    }

    /// Checkout directory of a remote package
    fn storage_path(&self, name: &str) -> Result<PathBuf> {
        let storage = self.config.repo_storage_directory.as_ref().ok_or_else(|| {
            error::config::invalid(format!(
                "package '{name}' is remote but repo_storage_directory is not set"
            ))
        })?;
        Ok(storage.join(name))
    }
}

/// A configured package whose directory is known
pub struct Package<'a> {
    descriptor: PackageDescriptor,
    path: PathBuf,
    binding: Option<RepositoryBinding>,
    checkout: Option<CheckoutOutcome>,
    strategy: Box<dyn PackageStrategy>,
    cache: &'a Cache,
    toolchain: Toolchain,
}

impl fmt::Debug for Package<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.descriptor.name)
            .field("path", &self.path)
            .field("kind", &self.strategy.kind())
            .finish_non_exhaustive()
    }
}

impl<'a> Package<'a> {
    /// Resolve `name` to a directory, checking out remote packages.
    ///
    /// Fails with `PackageNotConfigured` before touching the filesystem when
    /// the name is unknown.
    pub fn resolve(name: &str, ctx: &SyncContext<'a>) -> Result<Self> {
        let descriptor = ctx.config.get_package(name)?;
        match descriptor.source()? {
            PackageSource::Local(path) => {
                debug!(package = name, path = %path.display(), "local package");
                Ok(Self::new(descriptor.clone(), path.to_path_buf(), None, ctx))
            }
            PackageSource::Remote(remote) => {
                let path = ctx.storage_path(name)?;
                fs::create_dir_all(&path)?;
                let outcome = ctx.synchronizer().checkout(remote, &path)?;
                let binding = outcome.binding.clone();
                let mut package = Self::new(descriptor.clone(), path, Some(binding), ctx);
                package.checkout = Some(outcome);
                Ok(package)
            }
        }
    }

    /// Like [`Package::resolve`] but without any git operation.
    ///
    /// Remote packages point at their checkout directory as it is now.
    pub fn locate(name: &str, ctx: &SyncContext<'a>) -> Result<Self> {
        let descriptor = ctx.config.get_package(name)?;
        let (path, binding) = match descriptor.source()? {
            PackageSource::Local(path) => (path.to_path_buf(), None),
            PackageSource::Remote(remote) => {
                let url = ctx.resolver.clone_url(&remote.repository)?;
                (
                    ctx.storage_path(name)?,
                    Some(RepositoryBinding::new(remote, url)?),
                )
            }
        };
        Ok(Self::new(descriptor.clone(), path, binding, ctx))
    }

    fn new(
        descriptor: PackageDescriptor,
        path: PathBuf,
        binding: Option<RepositoryBinding>,
        ctx: &SyncContext<'a>,
    ) -> Self {
        Self {
            strategy: strategy_for(&path, &ctx.toolchain),
            descriptor,
            path,
            binding,
            checkout: None,
            cache: ctx.cache,
            toolchain: ctx.toolchain.clone(),
        }
    }

    /// Replace the detected kind
    #[allow(dead_code)] // used in tests
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn PackageStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_local(&self) -> bool {
        self.descriptor.is_local()
    }

    pub fn kind(&self) -> &'static str {
        self.strategy.kind()
    }

    pub fn binding(&self) -> Option<&RepositoryBinding> {
        self.binding.as_ref()
    }

    /// Directory npm treats as this package's project root
    pub fn manifest_dir(&self) -> PathBuf {
        self.strategy.manifest_dir(&self.path)
    }

    /// Result of the checkout done by [`Package::resolve`]
    pub fn checkout(&self) -> Option<&CheckoutOutcome> {
        self.checkout.as_ref()
    }

    /// Modification time of the package directory
    pub fn last_modified_date(&self) -> Result<SystemTime> {
        let metadata = fs::metadata(&self.path)
            .map_err(|e| error::fs::read_failed(self.path.display().to_string(), e.to_string()))?;
        Ok(metadata.modified()?)
    }

    /// Install the package unless the cache has seen its current state.
    pub fn install(&self) -> Result<StepOutcome> {
        let (name, is_local) = (self.name(), self.is_local());
        self.cache.with_key_lock(name, is_local, || -> Result<StepOutcome> {
            let modified = self.last_modified_date()?;
            if self.cache.modified_timestamp(name, is_local) >= modified {
                debug!(package = name, "install up to date");
                return Ok(StepOutcome::Skipped);
            }

            info!(package = name, kind = self.kind(), "installing");
            if cfg!(windows) {
                self.toolchain
                    .npm(&["config", "set", "script-shell", "powershell"], &self.path)?;
            }
            editable::remove_stale_markers(&self.toolchain, name, &self.path);
            self.strategy.install_routine(&self.path)?;

            // an mtime ahead of the clock must not keep the gate open
            let now = SystemTime::now();
            self.cache.update(name, is_local, |record| {
                record.modified_at = now.max(modified);
                record.installed_at = now;
            })?;
            Ok(StepOutcome::Ran)
        })
    }

    /// Build the package unless its build inputs are older than the last build.
    pub fn build(&self) -> Result<StepOutcome> {
        let (name, is_local) = (self.name(), self.is_local());
        self.cache.with_key_lock(name, is_local, || -> Result<StepOutcome> {
            let inputs = self.strategy.build_timestamp(&self.path)?;
            if self.cache.built_timestamp(name, is_local) >= inputs {
                debug!(package = name, "build up to date");
                return Ok(StepOutcome::Skipped);
            }

            info!(package = name, kind = self.kind(), "building");
            self.strategy.build_routine(&self.path)?;
            self.cache.store_built(name, is_local, SystemTime::now())?;
            Ok(StepOutcome::Ran)
        })
    }

    /// Whether npm's global link registry points at this package
    pub fn is_linked(&self) -> Result<bool> {
        let listing = self.npm_listing(link::GLOBAL_LINKS_ARGS, &self.path)?;
        Ok(link::listing_contains_path(&listing, &self.path))
    }

    /// Whether this package's dependency tree resolves `other` to `other_path`.
    ///
    /// An empty `other_path` only checks that `other` is present.
    pub fn is_linked_to(&self, other: &str, other_path: &str) -> Result<bool> {
        let listing = self.npm_listing(link::DEPENDENCIES_ARGS, &self.manifest_dir())?;
        Ok(link::listing_links_to(&listing, other, other_path))
    }

    pub fn shall_be_linked(&self) -> bool {
        self.descriptor.shall_be_linked()
    }

    fn npm_listing(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let command = display_command(&self.toolchain.npm, args);
        let output = self
            .toolchain
            .npm_output(args, cwd)
            .map_err(|e| error::package::link_query_failed(&command, e.to_string()))?;
        link::listing(output, &command)
    }
}
