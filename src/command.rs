// ============================================================================
// COMMANDS: typed units of work over the session cache
// ============================================================================
//
// A command line such as `brighten -20 photo dark` is turned into a
// `Command` by looking its name up in the registry. The registry entry
// checks the argument count and injects the operation's selector (channel,
// greyscale kind, axis, kernel); after construction nothing depends on the
// command's spelling.
// ============================================================================

use std::fmt;
use std::path::PathBuf;

use crate::canvas::{Channel, Image};
use crate::error::{EditError, Result};
use crate::io::{self, CodecOptions};
use crate::ops::{self, Axis, Filter, GreyscaleKind};
use crate::session::SessionCache;
use crate::{log_info, log_warn};

// ============================================================================
// Single-image transforms
// ============================================================================

/// A single-image transform with its typed parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    Component(Channel),
    Greyscale(GreyscaleKind),
    Flip(Axis),
    Brighten(i32),
    Filter(Filter),
    Sepia,
}

impl Transform {
    pub fn apply(&self, src: &Image) -> Image {
        match *self {
            Transform::Component(channel) => ops::isolate_channel(src, channel),
            Transform::Greyscale(kind) => ops::greyscale(src, kind),
            Transform::Flip(axis) => ops::flip(src, axis),
            Transform::Brighten(delta) => ops::brighten(src, delta),
            Transform::Filter(filter) => ops::convolve(src, &filter.kernel()),
            Transform::Sepia => ops::sepia(src),
        }
    }

    /// The script command name that produces this transform.
    pub fn command_name(&self) -> &'static str {
        match self {
            Transform::Component(Channel::Red) => "red-component",
            Transform::Component(Channel::Green) => "green-component",
            Transform::Component(Channel::Blue) => "blue-component",
            Transform::Greyscale(GreyscaleKind::Value) => "value-component",
            Transform::Greyscale(GreyscaleKind::Luma) => "luma-component",
            Transform::Greyscale(GreyscaleKind::Intensity) => "intensity-component",
            Transform::Flip(Axis::Horizontal) => "horizontal-flip",
            Transform::Flip(Axis::Vertical) => "vertical-flip",
            Transform::Brighten(_) => "brighten",
            Transform::Filter(Filter::Blur) => "blur",
            Transform::Filter(Filter::Sharpen) => "sharpen",
            Transform::Sepia => "sepia",
        }
    }

    /// Human-readable description for log lines.
    pub fn describe(&self) -> String {
        match self {
            Transform::Component(channel) => format!("isolate {} channel", channel.name()),
            Transform::Greyscale(kind) => format!("{} greyscale", kind.label()),
            Transform::Flip(axis) => format!("{} flip", axis.label()),
            Transform::Brighten(delta) => format!("brighten by {delta:+}"),
            Transform::Filter(filter) => format!("{} filter", filter.label()),
            Transform::Sepia => "sepia tone".to_string(),
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Load { path: PathBuf, name: String },
    Save { path: PathBuf, name: String },
    Apply { transform: Transform, src: String, dst: String },
    /// Results are stored in red, green, blue order.
    Split { src: String, dst: [String; 3] },
    /// Sources are read in red, green, blue order.
    Combine { dst: String, src: [String; 3] },
}

/// What a successfully executed command did to the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Images written under these names.
    Stored(Vec<String>),
    /// An image was written to disk.
    Saved(PathBuf),
    /// A single-image transform whose operand is not loaded; nothing happened.
    Skipped { missing: String },
}

impl Command {
    /// Build a command from its name and the argument tokens that followed it.
    pub fn parse(name: &str, args: &[String]) -> Result<Command> {
        let spec = lookup(name).ok_or_else(|| EditError::UnknownCommand(name.to_string()))?;
        spec.check_arity(args.len())?;
        (spec.build)(args)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Load { .. } => "load",
            Command::Save { .. } => "save",
            Command::Apply { transform, .. } => transform.command_name(),
            Command::Split { .. } => "rgb-split",
            Command::Combine { .. } => "rgb-combine",
        }
    }

    /// Run against the cache. Either every result is installed or none is.
    pub fn execute(&self, cache: &mut SessionCache, codec: &CodecOptions) -> Result<Outcome> {
        match self {
            Command::Load { path, name } => {
                let img = io::load_image(path)?;
                log_info!("loaded {} as '{}' ({}x{})", path.display(), name, img.width(), img.height());
                cache.insert(name.clone(), img);
                Ok(Outcome::Stored(vec![name.clone()]))
            }
            Command::Save { path, name } => {
                let img = cache
                    .get(name)
                    .ok_or_else(|| EditError::MissingOperand(name.clone()))?;
                io::save_image(path, img, codec)?;
                log_info!("saved '{}' to {}", name, path.display());
                Ok(Outcome::Saved(path.clone()))
            }
            Command::Apply { transform, src, dst } => {
                let Some(img) = cache.get(src) else {
                    log_warn!("{}: '{}' is not loaded, skipped", transform.command_name(), src);
                    return Ok(Outcome::Skipped { missing: src.clone() });
                };
                let result = transform.apply(img);
                log_info!("{}: '{}' -> '{}'", transform.describe(), src, dst);
                cache.insert(dst.clone(), result);
                Ok(Outcome::Stored(vec![dst.clone()]))
            }
            Command::Split { src, dst } => {
                let img = cache
                    .get(src)
                    .ok_or_else(|| EditError::MissingOperand(src.clone()))?;
                let parts = ops::split(img);
                for ((channel, name), part) in Channel::all().into_iter().zip(dst).zip(parts) {
                    log_info!("rgb-split: {} channel of '{}' -> '{}'", channel.name(), src, name);
                    cache.insert(name.clone(), part);
                }
                Ok(Outcome::Stored(dst.to_vec()))
            }
            Command::Combine { dst, src } => {
                let [r, g, b] = [&src[0], &src[1], &src[2]].map(|name| {
                    cache
                        .get(name)
                        .map(|img| (name.as_str(), img))
                        .ok_or_else(|| EditError::MissingOperand(name.clone()))
                });
                let result = ops::combine([r?, g?, b?])?;
                cache.insert(dst.clone(), result);
                Ok(Outcome::Stored(vec![dst.clone()]))
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Load { path, name } | Command::Save { path, name } => {
                write!(f, "{} {} {}", self.name(), path.display(), name)
            }
            Command::Apply {
                transform: Transform::Brighten(delta),
                src,
                dst,
            } => write!(f, "brighten {} {} {}", delta, src, dst),
            Command::Apply { src, dst, .. } => write!(f, "{} {} {}", self.name(), src, dst),
            Command::Split { src, dst } => {
                write!(f, "rgb-split {} {} {} {}", src, dst[0], dst[1], dst[2])
            }
            Command::Combine { dst, src } => {
                write!(f, "rgb-combine {} {} {} {}", dst, src[0], src[1], src[2])
            }
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

type Builder = fn(&[String]) -> Result<Command>;

/// One registry row: command name, argument names, constructor.
pub struct CommandSpec {
    pub name: &'static str,
    pub args: &'static [&'static str],
    build: Builder,
}

impl CommandSpec {
    pub fn usage(&self) -> String {
        let mut line = self.name.to_string();
        for arg in self.args {
            line.push_str(" <");
            line.push_str(arg);
            line.push('>');
        }
        line
    }

    pub fn check_arity(&self, actual: usize) -> Result<()> {
        if actual == self.args.len() {
            return Ok(());
        }
        Err(EditError::Arity {
            command: self.name.to_string(),
            usage: self.usage(),
            expected: self.args.len(),
            actual,
        })
    }
}

const SRC_DST: &[&str] = &["src", "dst"];

fn apply(transform: Transform, args: &[String]) -> Command {
    Command::Apply {
        transform,
        src: args[0].clone(),
        dst: args[1].clone(),
    }
}

static REGISTRY: &[CommandSpec] = &[
    CommandSpec {
        name: "load",
        args: &["path", "name"],
        build: |a| {
            Ok(Command::Load {
                path: PathBuf::from(&a[0]),
                name: a[1].clone(),
            })
        },
    },
    CommandSpec {
        name: "save",
        args: &["path", "name"],
        build: |a| {
            Ok(Command::Save {
                path: PathBuf::from(&a[0]),
                name: a[1].clone(),
            })
        },
    },
    CommandSpec {
        name: "red-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Component(Channel::Red), a)),
    },
    CommandSpec {
        name: "green-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Component(Channel::Green), a)),
    },
    CommandSpec {
        name: "blue-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Component(Channel::Blue), a)),
    },
    CommandSpec {
        name: "value-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Greyscale(GreyscaleKind::Value), a)),
    },
    CommandSpec {
        name: "luma-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Greyscale(GreyscaleKind::Luma), a)),
    },
    CommandSpec {
        name: "intensity-component",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Greyscale(GreyscaleKind::Intensity), a)),
    },
    CommandSpec {
        name: "horizontal-flip",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Flip(Axis::Horizontal), a)),
    },
    CommandSpec {
        name: "vertical-flip",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Flip(Axis::Vertical), a)),
    },
    CommandSpec {
        name: "brighten",
        args: &["delta", "src", "dst"],
        build: |a| {
            let delta = a[0].parse::<i32>().map_err(|_| EditError::InvalidArgument {
                command: "brighten".to_string(),
                what: "delta",
                value: a[0].clone(),
            })?;
            Ok(apply(Transform::Brighten(delta), &a[1..]))
        },
    },
    CommandSpec {
        name: "rgb-split",
        args: &["src", "dst-red", "dst-green", "dst-blue"],
        build: |a| {
            Ok(Command::Split {
                src: a[0].clone(),
                dst: [a[1].clone(), a[2].clone(), a[3].clone()],
            })
        },
    },
    CommandSpec {
        name: "rgb-combine",
        args: &["dst", "src-red", "src-green", "src-blue"],
        build: |a| {
            Ok(Command::Combine {
                dst: a[0].clone(),
                src: [a[1].clone(), a[2].clone(), a[3].clone()],
            })
        },
    },
    CommandSpec {
        name: "blur",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Filter(Filter::Blur), a)),
    },
    CommandSpec {
        name: "sharpen",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Filter(Filter::Sharpen), a)),
    },
    CommandSpec {
        name: "sepia",
        args: SRC_DST,
        build: |a| Ok(apply(Transform::Sepia, a)),
    },
];

/// Every image command, in help order.
pub fn registry() -> &'static [CommandSpec] {
    REGISTRY
}

pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}
