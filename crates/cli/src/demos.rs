//! Packs bundled with the CLI.

use clap::ValueEnum;
use serde_json::{Value, json};

use conduit_lib::macros::right_click::{self, RightClick};
use conduit_lib::member::{Dialog, Function, ItemModel, Recipe};
use conduit_lib::{MinecraftVersion, Pack, PackError, PackMetadata, Package};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
  /// A single function that greets the world
  Basic,
  /// A wand that runs a function when right-clicked, with its item model
  RightClick,
  /// Startup functions combined through tags
  Load,
}

/// What a demo produces.
pub struct DemoPacks {
  pub datapack: Option<Pack>,
  pub resourcepack: Option<Pack>,
}

impl Demo {
  pub const ALL: [Demo; 3] = [Demo::Basic, Demo::RightClick, Demo::Load];

  pub fn name(self) -> &'static str {
    match self {
      Demo::Basic => "basic",
      Demo::RightClick => "right-click",
      Demo::Load => "load",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Demo::Basic => "A single function that greets the world",
      Demo::RightClick => "A wand that runs a function when right-clicked",
      Demo::Load => "Startup functions combined through tags",
    }
  }

  pub fn packs(self, minecraft: MinecraftVersion) -> Result<DemoPacks, PackError> {
    match self {
      Demo::Basic => basic(minecraft),
      Demo::RightClick => wand(minecraft),
      Demo::Load => load(minecraft),
    }
  }
}

fn basic(minecraft: MinecraftVersion) -> Result<DemoPacks, PackError> {
  let mut pack = Pack::datapack(PackMetadata::new("Test datapack", minecraft))?;
  pack
    .namespace("test")?
    .add("hello_world", Function::new(["say Hello World!"]))?;

  Ok(DemoPacks {
    datapack: Some(pack),
    resourcepack: None,
  })
}

fn wand_item() -> Value {
  json!({
    "id": "minecraft:stick",
    "components": {
      "minecraft:custom_data": { "custom_id": "right_click:wand" },
      "minecraft:consumable": { "consume_seconds": 999999 },
      "minecraft:item_model": "right_click:wand",
    },
  })
}

fn wand(minecraft: MinecraftVersion) -> Result<DemoPacks, PackError> {
  let package = Package::new("right_click").with_version("1.0");
  let metadata = PackMetadata::new("Right click wand", minecraft).with_package(package);

  let mut datapack = Pack::datapack(metadata.clone())?;
  let on_right_click = right_click::define(datapack.macro_ids());
  let ns = datapack.namespace("right_click")?;

  ns.add(
    "give_wand",
    Function::new([concat!(
      "give @s stick[",
      "custom_data={custom_id:\"right_click:wand\"},",
      "consumable={consume_seconds:999999},",
      "item_model=\"right_click:wand\"]"
    )]),
  )?;
  ns.add_macro(
    "wand",
    on_right_click.call(RightClick::new(
      json!({ "minecraft:custom_data": { "custom_id": "right_click:wand" } }),
      Function::new([
        "tellraw @s \"Poof!\"",
        "particle dust{color:[0.9,0.7,1.0],scale:1} ^ ^ ^1",
      ]),
    )),
  )?;
  ns.add(
    "wand",
    Recipe::new(json!({
      "type": "minecraft:crafting_shaped",
      "pattern": ["  A", " A ", "A  "],
      "key": { "A": "minecraft:resin_clump" },
      "result": wand_item(),
    })),
  )?;

  let mut resourcepack = Pack::resourcepack(metadata)?;
  resourcepack.namespace("right_click")?.add(
    "wand",
    ItemModel::new(json!({
      "model": { "type": "minecraft:model", "model": "minecraft:item/blaze_rod" },
    })),
  )?;

  Ok(DemoPacks {
    datapack: Some(datapack),
    resourcepack: Some(resourcepack),
  })
}

fn load(minecraft: MinecraftVersion) -> Result<DemoPacks, PackError> {
  let mut pack = Pack::datapack(PackMetadata::new("Startup functions", minecraft))?;
  let ns = pack.namespace("startup")?;

  // Two independent features contributing to the same startup function.
  let load = ns.append_or_create("load", Function::new(["scoreboard objectives add clicks dummy"]))?;
  ns.append_or_create("load", Function::new(["say Loaded!"]))?;

  let tick = ns.add("tick", Function::new(["execute as @a run scoreboard players add @s clicks 0"]))?;
  let ticking = ns.tag::<Function>("ticking")?;
  ticking.add(&tick);

  if ns.formats().dialogs {
    ns.add(
      "welcome",
      Dialog::new(json!({
        "type": "minecraft:notice",
        "title": "Welcome",
      })),
    )?;
  }

  let minecraft_ns = pack.namespace("minecraft")?;
  minecraft_ns.tag::<Function>("load")?.add(&load);
  minecraft_ns.tag::<Function>("tick")?.add_tag(&ticking);

  Ok(DemoPacks {
    datapack: Some(pack),
    resourcepack: None,
  })
}
