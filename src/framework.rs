/*!
Running a test program.

A test implements [`Test`]. Its `init` step runs once after the context is created, and its
`display` step draws, checks what it drew and returns a verdict. Errors returned by either
step are turned into a verdict by [`resolve`], so setup code can simply use `?`:

 - `TestError::Skip` reports `skip`. This is what the `require_*` helpers return.
 - `TestError::Fail` reports `fail`. Broken shaders, vertex data or other fixtures end up here.

With the `glutin_backend` feature, [`main`] creates the window, runs the test and reports the
verdict. Without `-auto` the window stays on screen until it is closed.
*/
use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::rc::Rc;

use crate::backend::Facade;
use crate::context::Context;
use crate::result::{TestError, TestResult};

/// Default width and height of the test window.
pub const DEFAULT_WINDOW_SIZE: u32 = 160;

/// How a test program wants to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Width of the window in pixels.
    pub window_width: u32,
    /// Height of the window in pixels.
    pub window_height: u32,
    /// Run non-interactively: hide the window and report as soon as the test is done.
    pub auto: bool,
    /// Minimum desktop GL version. The test is skipped on older contexts.
    pub gl_version: Option<(u8, u8)>,
    /// Title of the window.
    pub title: String,
    /// Command line arguments not recognized by the framework, in order.
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            window_width: DEFAULT_WINDOW_SIZE,
            window_height: DEFAULT_WINDOW_SIZE,
            auto: false,
            gl_version: None,
            title: env::args().next().unwrap_or_else(|| "piglit".to_owned()),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Builds a configuration from command line arguments, without the program name.
    ///
    /// `-auto` and `--auto` turn on automatic mode. Everything else is kept in `args`.
    pub fn from_args<I, S>(args: I) -> Config
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        let mut config = Config::default();

        for arg in args {
            let arg = arg.into();
            match arg.as_str() {
                "-auto" | "--auto" => config.auto = true,
                _ => config.args.push(arg),
            }
        }

        config
    }

    /// Same as `from_args`, but also turns on automatic mode if `PIGLIT_AUTO` is set.
    pub fn from_env_and_args<I, S>(args: I) -> Config
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        Config::from_args(args).with_env_auto(env::var_os("PIGLIT_AUTO"))
    }

    fn with_env_auto(mut self, value: Option<OsString>) -> Config {
        if value.is_some() {
            self.auto = true;
        }
        self
    }

    /// Requires at least the given desktop GL version.
    pub fn with_gl_version(mut self, major: u8, minor: u8) -> Config {
        self.gl_version = Some((major, minor));
        self
    }

    /// Sets the window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Config {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: &str) -> Config {
        self.title = title.to_owned();
        self
    }
}

/// A test program.
pub trait Test {
    /// Runs once, after the context is created and before the first `display`.
    fn init(&mut self, _ctxt: &Rc<Context>) -> Result<(), TestError> {
        Ok(())
    }

    /// Draws, checks the outcome and returns the verdict.
    fn display(&mut self, ctxt: &Rc<Context>) -> Result<TestResult, TestError>;
}

/// Turns the outcome of a test step into a verdict, printing the error message if any.
///
/// Skip messages go to stdout. Failure messages go to stderr.
pub fn resolve(outcome: Result<TestResult, TestError>) -> TestResult {
    match outcome {
        Ok(result) => result,
        Err(err @ TestError::Skip(_)) => {
            println!("{}", err);
            err.result()
        },
        Err(err @ TestError::Fail(_)) => {
            eprintln!("{}", err);
            let _ = io::stderr().flush();
            err.result()
        },
    }
}

/// Checks the configured requirements, then runs `init` and `display` once.
pub fn run<F, T>(config: &Config, facade: &F, test: &mut T) -> TestResult
    where F: ?Sized + Facade, T: ?Sized + Test
{
    let ctxt = facade.get_context();

    let outcome = config.gl_version
        .map_or(Ok(()), |(major, minor)| ctxt.require_gl_version(major, minor))
        .and_then(|_| test.init(ctxt))
        .and_then(|_| test.display(ctxt));

    let result = resolve(outcome);
    log::debug!("test finished: {}", result);
    result
}

/// Skips the test unless this is a desktop context of at least the given version.
pub fn require_gl_version<F>(facade: &F, major: u8, minor: u8) -> Result<(), TestError>
    where F: ?Sized + Facade
{
    facade.get_context().require_gl_version(major, minor)
}

/// Skips the test unless the extension is supported.
pub fn require_extension<F>(facade: &F, name: &str) -> Result<(), TestError>
    where F: ?Sized + Facade
{
    facade.get_context().require_extension(name)
}

/// Returns true if the implementation advertises the extension.
pub fn is_extension_supported<F>(facade: &F, name: &str) -> bool
    where F: ?Sized + Facade
{
    facade.get_context().is_extension_supported(name)
}

/// Creates the window and context, runs the test and reports its verdict.
///
/// In automatic mode the verdict is reported as soon as `display` returns. Otherwise the
/// window is presented and `display` runs again on every redraw until the window is closed.
#[cfg(feature = "glutin_backend")]
pub fn main<T: Test>(config: Config, mut test: T) -> ! {
    use crate::backend::glutin::{self, WindowCreationError};

    let window = match glutin::build_window(&config) {
        Ok(window) => window,
        Err(err @ WindowCreationError::Context(_)) if config.gl_version.is_some() => {
            println!("{}", err);
            TestResult::Skip.report()
        },
        Err(err) => {
            eprintln!("{}", err);
            TestResult::Fail.report()
        },
    };

    let result = run(&config, &window, &mut test);

    if !config.auto {
        window.get_context().swap_buffers();
        window.wait_for_close(|ctxt| {
            resolve(test.display(ctxt));
            ctxt.swap_buffers();
        });
    }

    result.report()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_flags() {
        assert!(!Config::from_args(Vec::<String>::new()).auto);
        assert!(Config::from_args(vec!["-auto"]).auto);
        assert!(Config::from_args(vec!["--auto"]).auto);
        assert!(!Config::from_args(vec!["-automatic"]).auto);
    }

    #[test]
    fn env_auto() {
        assert!(Config::from_args(vec!["x"]).with_env_auto(Some("1".into())).auto);
        assert!(Config::from_args(vec!["x"]).with_env_auto(Some("".into())).auto);
        assert!(!Config::from_args(vec!["x"]).with_env_auto(None).auto);
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!((config.window_width, config.window_height), (160, 160));
        assert_eq!(config.gl_version, None);
    }
}
