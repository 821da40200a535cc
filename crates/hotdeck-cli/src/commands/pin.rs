//! Slot commands on the active hotbar

use clap::Args;
use hotdeck_core::{AddOutcome, EntityRef, SlotIndex, SlotItem};
use hotdeck_store::HotbarStore;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Args)]
pub struct PinArgs {
    pub uid: String,

    /// Display name (default: the uid)
    #[arg(long)]
    pub name: Option<String>,

    /// Entity source, e.g. "local"
    #[arg(long)]
    pub source: Option<String>,

    /// Slot to overwrite (default: first empty slot)
    #[arg(long)]
    pub index: Option<usize>,

    /// Launch parameter as key=value; may repeat
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct UnpinArgs {
    pub uid: String,

    /// Unpin from every hotbar, not only the active one
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct RestackArgs {
    #[arg(value_parser = parse_slot, allow_negative_numbers = true)]
    pub from: usize,

    #[arg(value_parser = parse_slot, allow_negative_numbers = true)]
    pub to: usize,
}

fn parse_param(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", input))
}

/// Slot numbers arrive as text and may be negative or fractional
fn parse_slot(input: &str) -> Result<usize, String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", input))?;
    SlotIndex::try_from(value)
        .map(SlotIndex::get)
        .map_err(|e| e.to_string())
}

pub fn pin(args: PinArgs, store: &mut HotbarStore) -> CmdResult {
    let name = args.name.unwrap_or_else(|| args.uid.clone());
    let mut entity = EntityRef::new(args.uid.clone(), name);
    if let Some(source) = args.source {
        entity = entity.with_source(source);
    }
    let mut item = SlotItem::new(entity);
    for (key, value) in args.params {
        item = item.with_param(key, value);
    }

    match store.add_to_hotbar(item, args.index)? {
        AddOutcome::Added(index) => println!("Pinned {} to slot {}", args.uid, index),
        AddOutcome::AlreadyPinned(index) => {
            println!("{} is already pinned at slot {}", args.uid, index)
        }
        AddOutcome::Overflow => return Err("active hotbar is full".into()),
        AddOutcome::OutOfRange => {
            return Err(format!("slot {:?} is out of range", args.index).into())
        }
    }
    Ok(())
}

pub fn unpin(args: UnpinArgs, store: &mut HotbarStore) -> CmdResult {
    let removed = if args.all {
        store.remove_all_hotbar_items(&args.uid)?
    } else {
        usize::from(store.remove_from_hotbar(&args.uid)?)
    };
    println!("Unpinned {} from {} hotbar(s)", args.uid, removed);
    Ok(())
}

pub fn restack(args: RestackArgs, store: &mut HotbarStore) -> CmdResult {
    store.restack_items(args.from, args.to)?;
    println!("Moved slot {} to {}", args.from, args.to);
    Ok(())
}
