use std::ffi::OsString;
use std::io::Read;
use std::marker::PhantomData;
use std::path::PathBuf;

use clap::{ArgMatches, Command};

use crate::apply;
use crate::cli::{ParsedFlags, Registry};
use crate::decode;
use crate::error::ConfigError;
use crate::meta::Flags;
use crate::schema::{self, Schema};
use crate::synth;
use crate::types::{Kind, Source};

/// Entry point for building a flagfig loader.
pub struct Flagfig;

impl Flagfig {
    pub fn builder<C: Flags>() -> FlagfigBuilder<C> {
        FlagfigBuilder::new()
    }
}

/// Builder for loading a config value from a JSON document and
/// command-line flags.
///
/// Controls three orthogonal axes:
///
/// - **Document**: [`from_file()`](Self::from_file),
///   [`from_bytes()`](Self::from_bytes), [`from_reader()`](Self::from_reader),
///   or a path given on the command line via
///   [`with_file_flag()`](Self::with_file_flag).
/// - **Flags**: [`use_flags()`](Self::use_flags) derives one option per
///   config leaf; [`with_args()`](Self::with_args) sets what gets parsed.
/// - **Validation**: [`strict()`](Self::strict) rejects unknown document keys.
///
/// Loading decodes the document onto the value first, then applies the
/// flags the caller actually typed: flags beat the document, and the
/// document beats whatever the value held before.
pub struct FlagfigBuilder<C: Flags> {
    source: Option<Source<'static>>,
    registry: Option<Registry>,
    args: Option<Vec<OsString>>,
    file_flag: Option<String>,
    strict: bool,
    _phantom: PhantomData<C>,
}

impl<C: Flags> FlagfigBuilder<C> {
    fn new() -> Self {
        Self {
            source: None,
            registry: None,
            args: None,
            file_flag: None,
            strict: false,
            _phantom: PhantomData,
        }
    }

    /// Derive command-line options from `C` and apply the supplied ones.
    pub fn use_flags(mut self) -> Self {
        self.registry.get_or_insert_with(Registry::new);
        self
    }

    /// Like [`use_flags()`](Self::use_flags), registering the options on
    /// the caller's own command. Its arguments parse alongside the config
    /// options; read them back from [`load_matches()`](Self::load_matches).
    pub fn use_flags_with(self, command: Command) -> Self {
        self.registry(Registry::from_command(command))
    }

    /// Use a prepared registry for the config options.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Read the document from a file. Replaces any earlier source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(Source::File(path.into()));
        self
    }

    /// Read the document from memory. Replaces any earlier source.
    pub fn from_bytes(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.source = Some(Source::Bytes(data.into()));
        self
    }

    /// Read the document from a stream. Replaces any earlier source.
    pub fn from_reader(mut self, reader: impl Read + 'static) -> Self {
        self.source = Some(Source::Reader(Box::new(reader)));
        self
    }

    /// Parse these arguments (without the program name) instead of the
    /// process's own.
    pub fn with_args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Register a text option `--<name>` whose value, when supplied and
    /// non-empty, is the path of the document. It overrides any source set
    /// on the builder. Only takes effect together with flags.
    pub fn with_file_flag(mut self, name: &str) -> Self {
        self.file_flag = Some(name.to_string());
        self
    }

    /// Enable or disable strict mode (default: `false`).
    /// In strict mode, document keys that match no field produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Load into `config`: decode the document, then apply supplied flags.
    ///
    /// On error `config` keeps whatever was written before the failure,
    /// including document fields decoded ahead of a failing one.
    pub fn load(self, config: &mut C) -> Result<(), ConfigError> {
        self.load_matches(config).map(|_| ())
    }

    /// Like [`load()`](Self::load), returning the parsed command line when
    /// flags are enabled.
    pub fn load_matches(mut self, config: &mut C) -> Result<Option<ArgMatches>, ConfigError> {
        let source = self.source.take();
        self.run(source, true, config)
    }

    /// Load with `reader` as the document. The file flag, if configured, is
    /// still accepted on the command line but never opened.
    pub fn parse<R: Read>(self, reader: R, config: &mut C) -> Result<(), ConfigError> {
        self.run(Some(Source::Reader(Box::new(reader))), false, config)
            .map(|_| ())
    }

    fn run<'a>(
        mut self,
        mut source: Option<Source<'a>>,
        resolve_file_flag: bool,
        config: &mut C,
    ) -> Result<Option<ArgMatches>, ConfigError> {
        let mut schema = schema::extract(&C::SHAPE)?;
        let flags = match self.registry.take() {
            Some(registry) => Some(self.parse_flags(registry, &mut schema)?),
            None => {
                if let Some(name) = &self.file_flag {
                    tracing::warn!(option = %name, "file flag configured without flags, ignoring it");
                }
                None
            }
        };

        if resolve_file_flag
            && let Some(name) = &self.file_flag
            && let Some(parsed) = &flags
            && let Some(path) = parsed.supplied_text(name)
        {
            tracing::debug!(path, "document path taken from the command line");
            source = Some(Source::File(PathBuf::from(path)));
        }

        if let Some(source) = source {
            let content = source.read_to_string()?;
            decode::decode_into(&content, config, &schema, self.strict)?;
            tracing::debug!(strict = self.strict, "decoded config document");
        }

        match flags {
            Some(parsed) => {
                apply::apply(config, &schema, &parsed)?;
                tracing::debug!(
                    supplied = parsed.supplied().count(),
                    "applied command-line flags"
                );
                Ok(Some(parsed.into_matches()))
            }
            None => Ok(None),
        }
    }

    fn parse_flags(
        &mut self,
        mut registry: Registry,
        schema: &mut Schema,
    ) -> Result<ParsedFlags, ConfigError> {
        if let Some(name) = &self.file_flag {
            registry.register(name, Kind::Text, "Path to the config file.")?;
        }
        synth::synthesize(schema, &mut registry)?;

        let args = match self.args.take() {
            Some(args) => args,
            None => std::env::args_os().skip(1).collect(),
        };
        let parsed = registry.parse(args)?;
        tracing::debug!(shape = schema.shape, "parsed command-line flags");
        Ok(parsed)
    }
}

/// Decode a JSON document from `reader` onto `config`, without flags.
pub fn parse<C, R>(reader: R, config: &mut C) -> Result<(), ConfigError>
where
    C: Flags,
    R: Read,
{
    Flagfig::builder::<C>().parse(reader, config)
}

/// Decode an in-memory JSON document onto `config`, without flags.
pub fn parse_bytes<C: Flags>(data: &[u8], config: &mut C) -> Result<(), ConfigError> {
    parse(data, config)
}
