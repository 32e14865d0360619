//! Supported requirements-file options.
//!
//! The whitelist of options pip documents for requirements files, with the
//! help text served on hover and completion. The parser carries its own
//! syntactic view of these flags; this table is the user-facing one.

/// One supported option flag.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub flag: &'static str,
    /// Whether the flag takes an argument (long flags complete as `flag=`).
    pub takes_value: bool,
    pub help: &'static str,
}

/// Options allowed in requirements files, per pip's documentation.
pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        flag: "-i",
        takes_value: true,
        help: "Base URL of the Python Package Index (default https://pypi.org/simple).",
    },
    OptionSpec {
        flag: "--index-url",
        takes_value: true,
        help: "Base URL of the Python Package Index (default https://pypi.org/simple).",
    },
    OptionSpec {
        flag: "--extra-index-url",
        takes_value: true,
        help: "Extra URLs of package indexes to use in addition to --index-url.",
    },
    OptionSpec {
        flag: "--no-index",
        takes_value: false,
        help: "Ignore package index (only looking at --find-links URLs instead).",
    },
    OptionSpec {
        flag: "-c",
        takes_value: true,
        help: "Constrain versions using the given constraints file.",
    },
    OptionSpec {
        flag: "--constraint",
        takes_value: true,
        help: "Constrain versions using the given constraints file.",
    },
    OptionSpec {
        flag: "-r",
        takes_value: true,
        help: "Install from the given requirements file.",
    },
    OptionSpec {
        flag: "--requirement",
        takes_value: true,
        help: "Install from the given requirements file.",
    },
    OptionSpec {
        flag: "-e",
        takes_value: true,
        help: "Install a project in editable mode from a local project path or a VCS url.",
    },
    OptionSpec {
        flag: "--editable",
        takes_value: true,
        help: "Install a project in editable mode from a local project path or a VCS url.",
    },
    OptionSpec {
        flag: "-f",
        takes_value: true,
        help: "If a URL or path to an html file, then parse for links to archives. If a local path or file:// URL that's a directory, then look for archives in the directory listing.",
    },
    OptionSpec {
        flag: "--find-links",
        takes_value: true,
        help: "If a URL or path to an html file, then parse for links to archives. If a local path or file:// URL that's a directory, then look for archives in the directory listing.",
    },
    OptionSpec {
        flag: "--no-binary",
        takes_value: true,
        help: "Do not use binary packages. Accepts :all:, :none:, or a comma-separated list of package names.",
    },
    OptionSpec {
        flag: "--only-binary",
        takes_value: true,
        help: "Do not use source packages. Accepts :all:, :none:, or a comma-separated list of package names.",
    },
    OptionSpec {
        flag: "--prefer-binary",
        takes_value: false,
        help: "Prefer binary packages over source packages, even if the source packages are newer.",
    },
    OptionSpec {
        flag: "--require-hashes",
        takes_value: false,
        help: "Require a hash to check each requirement against, for repeatable installs.",
    },
    OptionSpec {
        flag: "--pre",
        takes_value: false,
        help: "Include pre-release and development versions. By default, pip only finds stable versions.",
    },
    OptionSpec {
        flag: "--trusted-host",
        takes_value: true,
        help: "Mark this host or host:port pair as trusted, even though it does not have valid or any HTTPS.",
    },
    OptionSpec {
        flag: "--use-feature",
        takes_value: true,
        help: "Enable new functionality, that may be backward incompatible.",
    },
    OptionSpec {
        flag: "--global-option",
        takes_value: true,
        help: "Extra global options to be supplied to the setup.py call before the install or bdist_wheel command.",
    },
    OptionSpec {
        flag: "--config-settings",
        takes_value: true,
        help: "Configuration settings to be passed to the PEP 517 build backend.",
    },
    OptionSpec {
        flag: "--hash",
        takes_value: true,
        help: "Verify that the package's archive matches this hash before installing.",
    },
];

/// Help text for a flag, tolerating a trailing `=`.
pub fn option_help(flag: &str) -> Option<&'static str> {
    let flag = flag.trim_end_matches('=');
    OPTIONS
        .iter()
        .find(|spec| spec.flag == flag)
        .map(|spec| spec.help)
}

/// The label a flag completes as: long value-taking flags gain a `=`.
pub fn completion_label(spec: &OptionSpec) -> String {
    if spec.takes_value && spec.flag.starts_with("--") {
        format!("{}=", spec.flag)
    } else {
        spec.flag.to_string()
    }
}

/// All options whose flag starts with `prefix`.
pub fn matching_options(prefix: &str) -> impl Iterator<Item = &'static OptionSpec> {
    OPTIONS.iter().filter(move |spec| spec.flag.starts_with(prefix))
}
