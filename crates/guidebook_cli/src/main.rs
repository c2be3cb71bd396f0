//! Guidebook command-line host.
//!
//! # Responsibility
//! - Drive the core user-data and recommendation APIs from a terminal.
//! - Wire configuration, logging, SQLite storage and catalog files.

mod args;

use args::{
    Cli, Commands, FavoriteCommand, OnboardingCommand, PlanCommand, PlanMoveArgs, RandomArgs,
    VisitCommand,
};
use clap::Parser;
use guidebook_core::db::open_db;
use guidebook_core::service::plan_service::PlanDetail;
use guidebook_core::service::query_service::QueryService;
use guidebook_core::service::recommend::{reason_message, recommend_n};
use guidebook_core::text::{truncate_text, DEFAULT_TRUNCATE_CHARS, SUGGESTION_TRUNCATE_CHARS};
use guidebook_core::{
    init_logging_from_config, Catalog, CatalogLoader, CoreConfig, FileCatalogSource, Plan,
    PlanRepository, PlanService, SqliteKvStore, SystemClock, UserDataRepository,
};
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = match &cli.data_dir {
        Some(dir) => CoreConfig::with_data_dir(dir),
        None => CoreConfig::from_env(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(path) = &cli.sights {
        config.sights_path = path.clone();
    }
    if let Some(path) = &cli.souvenirs {
        config.souvenirs_path = path.clone();
    }
    config
}

fn run(command: Commands, config: &CoreConfig) -> CliResult<()> {
    std::fs::create_dir_all(&config.data_dir)?;
    let conn = open_db(config.db_path())?;
    let store = SqliteKvStore::try_new(&conn)?;
    let queries = QueryService::new(UserDataRepository::new(&store, SystemClock));
    let users = queries.repo();
    let plans = PlanService::new(PlanRepository::new(&store, SystemClock));
    let catalogs = CatalogLoader::new(FileCatalogSource::new(
        &config.sights_path,
        &config.souvenirs_path,
    ));

    match command {
        Commands::Recommend(random) => {
            let catalog = catalogs.catalog()?;
            let favorites = users.get_favorites()?;
            let visits = users.get_visits()?;
            let suggestions =
                recommend_n(&catalog, &favorites, &visits, random.count, &mut rng(&random));
            for suggestion in suggestions {
                println!(
                    "{}  {}  [{}]",
                    suggestion.route_path(),
                    suggestion.name,
                    reason_message(suggestion.item_type, suggestion.reason)
                );
                println!(
                    "    {}",
                    truncate_text(&suggestion.description, SUGGESTION_TRUNCATE_CHARS)
                );
            }
        }
        Commands::Search(search) => {
            let catalog = catalogs.catalog()?.filter_by_name(&search.query);
            print_catalog(&catalog);
        }
        Commands::Favorite(command) => run_favorite(command, &queries, &catalogs)?,
        Commands::Visit(command) => run_visit(command, users)?,
        Commands::Plan(command) => run_plan(command, &plans, users, &catalogs)?,
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&users.stats()?)?);
        }
        Commands::Onboarding(command) => match command {
            OnboardingCommand::Status => {
                println!("completed={}", users.is_onboarding_completed()?);
            }
            OnboardingCommand::Complete => users.complete_onboarding()?,
            OnboardingCommand::Reset => users.reset_onboarding()?,
        },
        Commands::Clear => {
            users.clear_all()?;
            info!("event=cli_clear module=cli status=ok");
            println!("all user data cleared");
        }
    }
    Ok(())
}

fn run_favorite(
    command: FavoriteCommand,
    queries: &QueryService<&SqliteKvStore<'_>, SystemClock>,
    catalogs: &CatalogLoader<FileCatalogSource>,
) -> CliResult<()> {
    let users = queries.repo();
    match command {
        FavoriteCommand::Add(item) => {
            let added = users.add_favorite(&item.key())?;
            println!("{} favorite=true changed={added}", item.key());
        }
        FavoriteCommand::Remove(item) => {
            let removed = users.remove_favorite(&item.key())?;
            println!("{} favorite=false changed={removed}", item.key());
        }
        FavoriteCommand::Toggle(item) => {
            let now_favorite = queries.toggle_favorite(&item.key())?;
            println!("{} favorite={now_favorite}", item.key());
        }
        FavoriteCommand::List => {
            let catalog = catalogs.catalog()?;
            for favorite in queries.favorite_items(&catalog.index())? {
                println!(
                    "{}/{}  {}  {}",
                    favorite.item_type,
                    favorite.id,
                    favorite.name,
                    truncate_text(&favorite.description, DEFAULT_TRUNCATE_CHARS)
                );
            }
        }
    }
    Ok(())
}

fn run_visit(
    command: VisitCommand,
    users: &UserDataRepository<&SqliteKvStore<'_>, SystemClock>,
) -> CliResult<()> {
    match command {
        VisitCommand::Add(args) => {
            let visit = users.add_visit(&args.item.key(), args.memo)?;
            println!("{}", serde_json::to_string_pretty(&visit)?);
        }
        VisitCommand::Remove(item) => {
            let removed = users.remove_visit(&item.key())?;
            println!("{} visited=false changed={removed}", item.key());
        }
        VisitCommand::Toggle(item) => {
            let now_visited = users.toggle_visit(&item.key())?;
            println!("{} visited={now_visited}", item.key());
        }
        VisitCommand::List => {
            for visit in users.get_visits()? {
                println!(
                    "{}  visited_at={}  memo={}",
                    visit.key(),
                    visit.visited_at,
                    visit.memo.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn run_plan(
    command: PlanCommand,
    plans: &PlanService<&SqliteKvStore<'_>, SystemClock>,
    users: &UserDataRepository<&SqliteKvStore<'_>, SystemClock>,
    catalogs: &CatalogLoader<FileCatalogSource>,
) -> CliResult<()> {
    match command {
        PlanCommand::Create(args) => print_plan(&plans.create_plan(args.name)?)?,
        PlanCommand::List => {
            for plan in plans.list_plans()? {
                println!("{}  {}  items={}", plan.id, plan.name, plan.items.len());
            }
        }
        PlanCommand::Show(args) => {
            let catalog = catalogs.catalog()?;
            match plans.plan_details(args.plan_id, &catalog.index())? {
                Some(detail) => print_plan_detail(&detail),
                None => println!("plan not found: {}", args.plan_id),
            }
        }
        PlanCommand::Rename(args) => print_plan(&plans.rename_plan(args.plan_id, args.name)?)?,
        PlanCommand::Delete(args) => {
            plans.delete_plan(args.plan_id)?;
            println!("deleted {}", args.plan_id);
        }
        PlanCommand::Add(args) => print_plan(&plans.add_item(args.plan_id, &args.item.key())?)?,
        PlanCommand::Remove(args) => {
            print_plan(&plans.remove_item(args.plan_id, &args.item.key())?)?
        }
        PlanCommand::Move(args) => move_plan_item(plans, args)?,
        PlanCommand::Random(args) => {
            let catalog = catalogs.catalog()?;
            let visits = users.get_visits()?;
            let plan = plans.create_random_plan(
                &args.name,
                args.random.count,
                &catalog,
                &visits,
                &mut rng(&args.random),
            )?;
            print_plan(&plan)?;
        }
    }
    Ok(())
}

fn move_plan_item(
    plans: &PlanService<&SqliteKvStore<'_>, SystemClock>,
    args: PlanMoveArgs,
) -> CliResult<()> {
    let key = args.item.key();
    let plan = plans
        .get_plan(args.plan_id)?
        .ok_or_else(|| format!("plan not found: {}", args.plan_id))?;
    let mut items = plan.items;
    let from = items
        .iter()
        .position(|item| item.matches(&key))
        .ok_or_else(|| format!("{key} is not in plan {}", args.plan_id))?;
    let moved = items.remove(from);
    items.insert(args.position.min(items.len()), moved);
    print_plan(&plans.reorder_items(args.plan_id, items)?)
}

fn rng(args: &RandomArgs) -> StdRng {
    match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_plan(plan: &Plan) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(plan)?);
    Ok(())
}

fn print_plan_detail(detail: &PlanDetail) {
    println!("{}  {}", detail.plan.id, detail.plan.name);
    for item in &detail.items {
        println!("  {}. {}  {}", item.order + 1, item.name, item.route_path());
    }
}

fn print_catalog(catalog: &Catalog) {
    for item in catalog.items() {
        println!(
            "{}  {}  {}",
            item.key().route_path(),
            item.name(),
            truncate_text(item.description(), DEFAULT_TRUNCATE_CHARS)
        );
    }
}
