//! Command implementations.
//!
//! Each submodule handles one command group and returns the value to print.

pub mod assistance;
pub mod backup;
pub mod beneficiary;
pub mod employee;
pub mod operation;
pub mod report;
pub mod session;
pub mod settings;
pub mod task;
pub mod user;

use serde_json::Value;

use auth_service_lib::service::AuthService;
use common::AppResult;
use domain::UserProfile;
use records_service_lib::service::ServiceContainer;

use crate::cli::Commands;

/// What every command works against.
pub struct Context<'a> {
    pub services: &'a dyn ServiceContainer,
    pub auth: &'a dyn AuthService,
}

impl<'a> Context<'a> {
    pub fn new(services: &'a dyn ServiceContainer, auth: &'a dyn AuthService) -> Self {
        Self { services, auth }
    }

    /// The signed-in user; fails with `Unauthorized` without a session.
    pub async fn user(&self) -> AppResult<UserProfile> {
        self.auth.current_user().await
    }
}

/// Run one command and return what it prints.
pub async fn execute(command: Commands, ctx: &Context<'_>) -> AppResult<Value> {
    if !command.is_public() {
        // Every other command needs a session
        ctx.user().await?;
    }

    match command {
        Commands::Login(args) => session::login(args, ctx).await,
        Commands::Logout => session::logout(ctx).await,
        Commands::Whoami => session::whoami(ctx).await,
        Commands::Dashboard => report::dashboard(ctx).await,
        Commands::Employee(args) => employee::execute(args.action, ctx).await,
        Commands::Beneficiary(args) => beneficiary::execute(args.action, ctx).await,
        Commands::Assistance(args) => assistance::execute(args.action, ctx).await,
        Commands::Operation(args) => operation::execute(args.action, ctx).await,
        Commands::Task(args) => task::execute(args.action, ctx).await,
        Commands::User(args) => user::execute(args.action, ctx).await,
        Commands::Settings(args) => settings::execute(args.action, ctx).await,
        Commands::Search(args) => report::search(args, ctx).await,
        Commands::Incentive(args) => report::incentive(args, ctx).await,
        Commands::Backup(args) => backup::backup(args, ctx).await,
        Commands::Restore(args) => backup::restore(args, ctx).await,
        Commands::Export(args) => backup::export(args.action, ctx).await,
        Commands::AutoBackup => backup::auto_backup(ctx).await,
    }
}

/// Fixtures shared by the command tests: real services over a temp dir.
#[cfg(test)]
pub(crate) mod testing {
    use tempfile::TempDir;

    use auth_service_lib::config::AuthServiceConfig;
    use auth_service_lib::service::{AuthService, Authenticator};
    use common::StorageConfig;
    use records_service_lib::config::RecordsServiceConfig;
    use records_service_lib::service::{ServiceContainer, Services};

    use super::Context;

    pub struct Harness {
        pub dir: TempDir,
        pub services: Services,
        pub auth: Authenticator,
    }

    impl Harness {
        pub async fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let storage = StorageConfig::in_dir(dir.path());
            let config = RecordsServiceConfig::default().with_storage(storage.clone());
            let services = records_service_lib::open(config).await.unwrap();
            let auth = auth_service_lib::authenticator(
                services.store(),
                &AuthServiceConfig::from_storage(&storage),
            );
            Self { dir, services, auth }
        }

        /// Signed in as the bootstrap manager
        pub async fn signed_in() -> Self {
            let harness = Self::new().await;
            harness.auth.login("Admin", "Admin").await.unwrap();
            harness
        }

        pub fn ctx(&self) -> Context<'_> {
            Context::new(&self.services, &self.auth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Harness;
    use super::*;
    use clap::Parser;
    use common::AppError;

    use crate::cli::Cli;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["charity-desk"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[tokio::test]
    async fn commands_need_a_session() {
        let harness = Harness::new().await;
        let err = execute(parse(&["employee", "list"]), &harness.ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn login_then_whoami() {
        let harness = Harness::new().await;
        let ctx = harness.ctx();

        execute(parse(&["login", " admin ", "-p", "Admin"]), &ctx)
            .await
            .unwrap();
        let me = execute(parse(&["whoami"]), &ctx).await.unwrap();
        assert_eq!(me["username"], "Admin");
        assert_eq!(me["role"], "manager");

        execute(parse(&["logout"]), &ctx).await.unwrap();
        assert!(execute(parse(&["whoami"]), &ctx).await.is_err());
    }
}
