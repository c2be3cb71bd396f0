//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use guidebook_core::{ItemKey, ItemType};
use std::path::PathBuf;
use uuid::Uuid;

/// Guidebook - favorites, visits and plans for the Kyoto guide.
#[derive(Parser, Debug)]
#[command(name = "guidebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the database and logs
    #[arg(long, env = "GUIDEBOOK_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long, env = "GUIDEBOOK_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Sight catalog JSON file
    #[arg(long, env = "GUIDEBOOK_SIGHTS_PATH", global = true)]
    pub sights: Option<PathBuf>,

    /// Souvenir catalog JSON file
    #[arg(long, env = "GUIDEBOOK_SOUVENIRS_PATH", global = true)]
    pub souvenirs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show suggestions for the discover screen
    Recommend(RandomArgs),

    /// Search both catalogs by name
    Search(SearchArgs),

    /// Manage favorites
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// Manage visit history
    #[command(subcommand)]
    Visit(VisitCommand),

    /// Manage itinerary plans
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Show favorite/visit/plan counts
    Stats,

    /// Inspect or change the onboarding flag
    #[command(subcommand)]
    Onboarding(OnboardingCommand),

    /// Delete all stored user data
    Clear,
}

/// Subcommands for `guidebook favorite`
#[derive(Subcommand, Debug)]
pub enum FavoriteCommand {
    /// Add an item to favorites
    Add(ItemArgs),
    /// Remove an item from favorites
    Remove(ItemArgs),
    /// Flip favorite state of an item
    Toggle(ItemArgs),
    /// List favorites with catalog names
    List,
}

/// Subcommands for `guidebook visit`
#[derive(Subcommand, Debug)]
pub enum VisitCommand {
    /// Record a visit, replacing any earlier one
    Add(VisitAddArgs),
    /// Forget a visit
    Remove(ItemArgs),
    /// Flip visited state of an item
    Toggle(ItemArgs),
    /// List visit history
    List,
}

/// Subcommands for `guidebook plan`
#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Create an empty plan
    Create(PlanNameArgs),
    /// List all plans
    List,
    /// Show one plan with resolved items
    Show(PlanIdArg),
    /// Rename a plan
    Rename(PlanRenameArgs),
    /// Delete a plan
    Delete(PlanIdArg),
    /// Append an item to a plan
    Add(PlanItemArgs),
    /// Remove an item from a plan
    Remove(PlanItemArgs),
    /// Move an item to a new position
    Move(PlanMoveArgs),
    /// Create a plan from random sights, unvisited only while any remain
    Random(RandomPlanArgs),
}

/// Subcommands for `guidebook onboarding`
#[derive(Subcommand, Debug)]
pub enum OnboardingCommand {
    /// Print whether onboarding was completed
    Status,
    /// Mark onboarding as completed
    Complete,
    /// Clear the onboarding flag
    Reset,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Sight,
    Souvenir,
}

impl From<KindArg> for ItemType {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Sight => ItemType::Sight,
            KindArg::Souvenir => ItemType::Souvenir,
        }
    }
}

/// Item address: catalog kind plus id.
#[derive(Args, Debug)]
pub struct ItemArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,
}

impl ItemArgs {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.id.as_str(), self.kind.into())
    }
}

#[derive(Args, Debug)]
pub struct VisitAddArgs {
    #[command(flatten)]
    pub item: ItemArgs,
    /// Free-text note stored with the visit
    #[arg(long)]
    pub memo: Option<String>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Args, Debug)]
pub struct RandomArgs {
    /// Number of suggestions
    #[arg(short = 'n', long, default_value_t = 3)]
    pub count: usize,
    /// Seed for reproducible picks
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PlanIdArg {
    pub plan_id: Uuid,
}

#[derive(Args, Debug)]
pub struct PlanNameArgs {
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PlanRenameArgs {
    pub plan_id: Uuid,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct PlanItemArgs {
    pub plan_id: Uuid,
    #[command(flatten)]
    pub item: ItemArgs,
}

#[derive(Args, Debug)]
pub struct PlanMoveArgs {
    pub plan_id: Uuid,
    #[command(flatten)]
    pub item: ItemArgs,
    /// Zero-based target position
    pub position: usize,
}

#[derive(Args, Debug)]
pub struct RandomPlanArgs {
    /// Plan name; defaults to "Random N-stop plan"
    #[arg(long, default_value = "")]
    pub name: String,
    #[command(flatten)]
    pub random: RandomArgs,
}
