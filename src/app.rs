use async_trait::async_trait;
use loco_rs::{
    app::{AppContext, Hooks, Initializer},
    bgworker::{BackgroundWorker, Queue},
    boot::{create_app, BootResult, StartMode},
    config::Config,
    controller::AppRoutes,
    db::truncate_table,
    environment::Environment,
    task::Tasks,
    Result,
};
use migration::Migrator;
use std::path::Path;

use crate::controllers;
use crate::models::_entities::prelude::{
    Albums, Faces, Persons, Photos, TripMembers, Trips, Users,
};
use crate::workers::face_scan::FaceScanWorker;

pub struct App;

#[async_trait]
impl Hooks for App {
    fn app_name() -> &'static str {
        env!("CARGO_CRATE_NAME")
    }

    fn app_version() -> String {
        format!(
            "{} ({})",
            env!("CARGO_PKG_VERSION"),
            option_env!("BUILD_SHA")
                .or(option_env!("GITHUB_SHA"))
                .unwrap_or("dev")
        )
    }

    async fn boot(mode: StartMode, environment: &Environment, config: Config) -> Result<BootResult> {
        create_app::<Self, Migrator>(mode, environment, config).await
    }

    async fn initializers(_ctx: &AppContext) -> Result<Vec<Box<dyn Initializer>>> {
        Ok(vec![])
    }

    fn routes(_ctx: &AppContext) -> AppRoutes {
        AppRoutes::with_default_routes()
            .add_route(controllers::auth::routes())
            .add_route(controllers::trips::routes())
            .add_route(controllers::albums::routes())
            .add_route(controllers::photos::routes())
            .add_route(controllers::people::routes())
            .add_route(controllers::download::routes())
    }

    async fn connect_workers(ctx: &AppContext, queue: &Queue) -> Result<()> {
        queue.register(FaceScanWorker::build(ctx)).await?;
        Ok(())
    }

    #[allow(unused_variables)]
    fn register_tasks(tasks: &mut Tasks) {}

    async fn truncate(ctx: &AppContext) -> Result<()> {
        // children first so foreign keys never dangle
        truncate_table(&ctx.db, Faces).await?;
        truncate_table(&ctx.db, Persons).await?;
        truncate_table(&ctx.db, Photos).await?;
        truncate_table(&ctx.db, Albums).await?;
        truncate_table(&ctx.db, TripMembers).await?;
        truncate_table(&ctx.db, Trips).await?;
        truncate_table(&ctx.db, Users).await?;
        Ok(())
    }

    async fn seed(_ctx: &AppContext, _base: &Path) -> Result<()> {
        Ok(())
    }
}
