use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Everything the bot needs to set up a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
    /// Fixed seed for reproducible games. A fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Pause between moves, to make the game watchable.
    pub delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            height: 8,
            width: 8,
            mines: 8,
            seed: None,
            delay: Duration::from_millis(500),
        }
    }
}

impl Settings {
    /// Parses `--height N --width N --mines N --seed N --delay MS`, all optional.
    pub fn from_args<I, S>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Settings::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let flag = flag.as_ref().to_owned();
            let value = match args.next() {
                Some(value) => value.as_ref().to_owned(),
                None => anyhow::bail!("missing value for {flag}"),
            };
            let number: u64 = value
                .parse()
                .map_err(|e| anyhow::anyhow!("bad value {value:?} for {flag}: {e}"))?;
            match flag.as_str() {
                "--height" => settings.height = number as usize,
                "--width" => settings.width = number as usize,
                "--mines" => settings.mines = number as usize,
                "--seed" => settings.seed = Some(number),
                "--delay" => settings.delay = Duration::from_millis(number),
                _ => anyhow::bail!("unknown flag {flag}"),
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.height == 0 || self.width == 0 {
            anyhow::bail!("the board needs at least one row and one column");
        }
        if self.mines >= self.height * self.width {
            anyhow::bail!(
                "{} mines don't fit on a {}x{} board",
                self.mines,
                self.width,
                self.height
            );
        }
        Ok(())
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
