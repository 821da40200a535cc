//! Hotbar management commands

use clap::{Args, ValueEnum};
use hotdeck_core::{Direction, NewHotbar};
use hotdeck_store::HotbarStore;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Also print the slots of every hotbar, not only the active one
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub name: String,

    /// Explicit hotbar id (default: generated)
    #[arg(long)]
    pub id: Option<String>,

    /// Make the new hotbar active
    #[arg(long)]
    pub activate: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Args)]
pub struct ActiveArgs {
    /// Activate the hotbar with this id
    #[arg(long, conflicts_with = "name")]
    pub id: Option<String>,

    /// Activate the first hotbar with this name
    #[arg(long, conflicts_with = "id")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwitchDirection {
    Next,
    Previous,
}

#[derive(Debug, Args)]
pub struct SwitchArgs {
    #[arg(value_enum, default_value = "next")]
    pub direction: SwitchDirection,
}

pub fn list(args: ListArgs, store: &HotbarStore) -> CmdResult {
    let hotbars = store.hotbars();
    let active_id = hotbars.active_id();

    for hotbar in hotbars.hotbars() {
        let is_active = Some(hotbar.id()) == active_id;
        let marker = if is_active { "*" } else { " " };
        println!("{} {}  ({})", marker, hotbars.display_label(hotbar.id()), hotbar.id());

        if is_active || args.all {
            for (index, slot) in hotbar.items().iter().enumerate() {
                if let Some(item) = slot {
                    let name = item.entity.name.as_deref().unwrap_or(item.uid());
                    println!("    [{:>2}] {} ({})", index, name, item.uid());
                }
            }
        }
    }
    Ok(())
}

pub fn add(args: AddArgs, store: &mut HotbarStore) -> CmdResult {
    let mut data = NewHotbar::named(args.name);
    if let Some(id) = args.id {
        data = data.with_id(id);
    }
    let id = store.add(data, args.activate)?;
    println!("{}", id);
    Ok(())
}

pub fn remove(args: RemoveArgs, store: &mut HotbarStore) -> CmdResult {
    if store.remove(&args.id)? {
        println!("Removed hotbar {}", args.id);
    } else {
        println!("No hotbar {}", args.id);
    }
    Ok(())
}

pub fn rename(args: RenameArgs, store: &mut HotbarStore) -> CmdResult {
    store.rename(&args.id, &args.name)?;
    println!("{}", store.hotbars().display_label(&args.id));
    Ok(())
}

pub fn active(args: ActiveArgs, store: &mut HotbarStore) -> CmdResult {
    if let Some(id) = args.id {
        store.set_active(&id)?;
    } else if let Some(name) = args.name {
        store.set_active_by_name(&name)?;
    }
    print_active(store);
    Ok(())
}

pub fn switch(args: SwitchArgs, store: &mut HotbarStore) -> CmdResult {
    let direction = match args.direction {
        SwitchDirection::Next => Direction::Next,
        SwitchDirection::Previous => Direction::Previous,
    };
    store.switch_active(direction)?;
    print_active(store);
    Ok(())
}

fn print_active(store: &HotbarStore) {
    if let Some(id) = store.hotbars().active_id() {
        println!("{}", store.hotbars().display_label(id));
    }
}
