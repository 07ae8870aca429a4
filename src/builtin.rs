use crate::env::Environment;
use crate::io_adapters::LineSource;
use crate::retry::os_reason;
use crate::tokenizer::is_separator;
use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

/// Commands implemented inside the shell process itself.
///
/// Lookup walks [`Builtin::ALL`] in order and the first matching name wins;
/// anything unmatched is left for external execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Refused: this process must not terminate on request.
    Exit,
    Help,
    Echo,
    Ls,
    Cat,
    Save,
    Pwd,
    Cd,
    /// Placeholder that only prints a remark.
    Run,
}

impl Builtin {
    /// Every built-in, in dispatch order.
    pub const ALL: [Builtin; 9] = [
        Builtin::Exit,
        Builtin::Help,
        Builtin::Echo,
        Builtin::Ls,
        Builtin::Cat,
        Builtin::Save,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::Run,
    ];

    /// Canonical name of the command, e.g. "echo" or "cd".
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Help => "help",
            Builtin::Echo => "echo",
            Builtin::Ls => "ls",
            Builtin::Cat => "cat",
            Builtin::Save => "save",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
            Builtin::Run => "run",
        }
    }

    /// The built-in called `name`, if there is one.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Executes the command with the arguments that followed its name.
    ///
    /// An `Err` is a locally reportable failure (missing argument, unreadable file
    /// and so on); the caller prints it and carries on.
    pub fn execute(
        self,
        args: &[&str],
        input: &mut dyn LineSource,
        stdout: &mut dyn Write,
        env: &Environment,
    ) -> Result<()> {
        match self {
            Builtin::Exit => {
                writeln!(stdout, "Use reboot/poweroff - 'exit' disabled in init.")?;
            }
            Builtin::Help => help(stdout, env)?,
            Builtin::Echo => writeln!(stdout, "{}", args.join(" "))?,
            Builtin::Ls => list_files(stdout, env)?,
            Builtin::Cat => {
                let Some(name) = args.first() else {
                    bail!("Usage: cat <filename>");
                };
                cat_file(name, stdout, env)?;
            }
            Builtin::Save => {
                let Some(name) = args.first() else {
                    bail!("Usage: save <filename>");
                };
                save_file(name, input, stdout, env)?;
            }
            Builtin::Pwd => writeln!(stdout, "{}", env.current_dir)?,
            Builtin::Cd => {
                let target = args.first().copied().unwrap_or("/");
                env::set_current_dir(target)
                    .map_err(|e| anyhow!("cd: {}: {}", target, os_reason(&e)))?;
            }
            Builtin::Run => writeln!(stdout, "What are you running from?")?,
        }
        Ok(())
    }
}

fn help(stdout: &mut dyn Write, env: &Environment) -> Result<()> {
    writeln!(
        stdout,
        "Built-ins: help, echo <text>, ls, cat <file>, save <file>, pwd, cd <dir>, exit"
    )?;
    writeln!(
        stdout,
        "External programs: type program name or ./prog / absolute paths"
    )?;
    writeln!(stdout, "Searched in: {}", env.search_path)?;
    Ok(())
}

fn list_files(stdout: &mut dyn Write, env: &Environment) -> Result<()> {
    let entries = fs::read_dir(&env.mount)
        .map_err(|e| anyhow!("Cannot open {}: {}", env.mount.display(), os_reason(&e)))?;
    for entry in entries.map_while(Result::ok) {
        writeln!(stdout, "{}", entry.file_name().to_string_lossy())?;
    }
    Ok(())
}

fn cat_file(name: &str, stdout: &mut dyn Write, env: &Environment) -> Result<()> {
    let mut file = File::open(env.mount_path(name))
        .map_err(|e| anyhow!("File not found: {} ({})", name, os_reason(&e)))?;
    io::copy(&mut file, stdout).with_context(|| format!("cat: {name}"))?;
    Ok(())
}

/// Copy lines from `input` into the file until a lone `.` (or end of input).
fn save_file(
    name: &str,
    input: &mut dyn LineSource,
    stdout: &mut dyn Write,
    env: &Environment,
) -> Result<()> {
    let file = File::create(env.mount_path(name))
        .map_err(|e| anyhow!("Cannot create file: {} ({})", name, os_reason(&e)))?;
    let mut file = BufWriter::new(file);

    writeln!(
        stdout,
        "Enter content. End with a single line containing only '.'"
    )?;
    while let Some(line) = input.read_line("> ", stdout)? {
        let line = line.trim_matches(is_separator);
        if line == "." {
            break;
        }
        file.write_all(line.as_bytes())
            .and_then(|()| file.write_all(b"\n"))
            .with_context(|| format!("save: {name}"))?;
    }
    file.flush().with_context(|| format!("save: {name}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::BufReadSource;
    use crate::resolver::SearchPath;
    use crate::test_support::lock_current_dir;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn mounted_env() -> (TempDir, Environment) {
        let mount = tempfile::tempdir().unwrap();
        let env = Environment::new(mount.path(), SearchPath::default());
        (mount, env)
    }

    fn run(
        builtin: Builtin,
        args: &[&str],
        input: &str,
        env: &Environment,
    ) -> (Result<()>, String) {
        let mut source = BufReadSource::new(Cursor::new(input.to_string()));
        let mut out = Vec::new();
        let res = builtin.execute(args, &mut source, &mut out, env);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_lookup_matches_every_name() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::lookup(builtin.name()), Some(builtin));
        }
    }

    #[test]
    fn test_lookup_falls_through_for_unknown_names() {
        for name in ["ECHO", "snake", "./ls", "/bin/cat", "", "exit2"] {
            assert_eq!(Builtin::lookup(name), None, "{name}");
        }
    }

    #[test]
    fn test_echo_joins_with_single_spaces() {
        let env = Environment::default();
        let (res, out) = run(Builtin::Echo, &["a", "b"], "", &env);
        assert!(res.is_ok());
        assert_eq!(out, "a b\n");

        let (_, out) = run(Builtin::Echo, &[], "", &env);
        assert_eq!(out, "\n");

        let (_, out) = run(Builtin::Echo, &["-n", "--help"], "", &env);
        assert_eq!(out, "-n --help\n");
    }

    #[test]
    fn test_help_lists_search_path() {
        let env = Environment::new("/mnt", SearchPath::new(vec!["/opt/bin".into()]));
        let (res, out) = run(Builtin::Help, &[], "", &env);
        assert!(res.is_ok());
        assert!(out.starts_with("Built-ins: help, echo <text>, ls,"));
        assert!(out.ends_with("Searched in: /opt/bin\n"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_exit_and_run_only_print_guidance() {
        let env = Environment::default();
        let (res, out) = run(Builtin::Exit, &["0"], "", &env);
        assert!(res.is_ok());
        assert_eq!(out, "Use reboot/poweroff - 'exit' disabled in init.\n");

        let (res, out) = run(Builtin::Run, &["snake"], "", &env);
        assert!(res.is_ok());
        assert_eq!(out, "What are you running from?\n");
    }

    #[test]
    fn test_pwd_prints_resolved_dir() {
        let mut env = Environment::default();
        env.current_dir = "/some/where".to_string();
        let (res, out) = run(Builtin::Pwd, &[], "", &env);
        assert!(res.is_ok());
        assert_eq!(out, "/some/where\n");
    }

    #[test]
    fn test_ls_skips_dot_entries() {
        let (mount, env) = mounted_env();
        fs::write(mount.path().join("b.txt"), "").unwrap();
        fs::write(mount.path().join("a.txt"), "").unwrap();
        fs::create_dir(mount.path().join("dir")).unwrap();

        let (res, out) = run(Builtin::Ls, &[], "", &env);
        assert!(res.is_ok());
        let mut names: Vec<&str> = out.lines().collect();
        names.sort();
        assert_eq!(names, ["a.txt", "b.txt", "dir"]);
    }

    #[test]
    fn test_ls_reports_missing_mount() {
        let env = Environment::new("/definitely/not/mounted", SearchPath::default());
        let (res, out) = run(Builtin::Ls, &[], "", &env);
        assert!(out.is_empty());
        assert_eq!(
            res.unwrap_err().to_string(),
            "Cannot open /definitely/not/mounted: No such file or directory"
        );
    }

    #[test]
    fn test_cat_streams_bytes_verbatim() {
        let (mount, env) = mounted_env();
        let content = b"line one\n\x00binary\xfe\nno newline";
        fs::write(mount.path().join("data"), content).unwrap();

        let mut source = BufReadSource::new(Cursor::new(Vec::new()));
        let mut out = Vec::new();
        Builtin::Cat
            .execute(&["data"], &mut source, &mut out, &env)
            .unwrap();
        assert_eq!(out, content);
    }

    #[test]
    fn test_cat_missing_argument_and_missing_file() {
        let (_mount, env) = mounted_env();
        let (res, _) = run(Builtin::Cat, &[], "", &env);
        assert_eq!(res.unwrap_err().to_string(), "Usage: cat <filename>");

        let (res, out) = run(Builtin::Cat, &["nonexistent"], "", &env);
        assert!(out.is_empty());
        assert_eq!(
            res.unwrap_err().to_string(),
            "File not found: nonexistent (No such file or directory)"
        );
    }

    #[test]
    fn test_save_writes_until_dot() {
        let (mount, env) = mounted_env();
        let input = "hello\n  world  \n.\nafter\n";
        let (res, out) = run(Builtin::Save, &["foo.txt"], input, &env);
        assert!(res.is_ok());
        assert_eq!(
            out,
            "Enter content. End with a single line containing only '.'\n> > > "
        );
        assert_eq!(
            fs::read_to_string(mount.path().join("foo.txt")).unwrap(),
            "hello\nworld\n"
        );
    }

    #[test]
    fn test_save_trims_only_c_whitespace() {
        let (mount, env) = mounted_env();
        let input = "\t\u{a0}keep\u{2003} \x0b\n.\n";
        let (res, _) = run(Builtin::Save, &["wide"], input, &env);
        assert!(res.is_ok());
        assert_eq!(
            fs::read_to_string(mount.path().join("wide")).unwrap(),
            "\u{a0}keep\u{2003}\n"
        );
    }

    #[test]
    fn test_save_then_cat_round_trips() {
        let (_mount, env) = mounted_env();
        let (res, _) = run(Builtin::Save, &["foo.txt"], "hello\n.\n", &env);
        assert!(res.is_ok());
        let (res, out) = run(Builtin::Cat, &["foo.txt"], "", &env);
        assert!(res.is_ok());
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_save_stops_at_end_of_input() {
        let (mount, env) = mounted_env();
        let (res, _) = run(Builtin::Save, &["partial"], "only line\n", &env);
        assert!(res.is_ok());
        assert_eq!(
            fs::read_to_string(mount.path().join("partial")).unwrap(),
            "only line\n"
        );
    }

    #[test]
    fn test_save_truncates_existing_file() {
        let (mount, env) = mounted_env();
        fs::write(mount.path().join("f"), "old content\n").unwrap();
        let (res, _) = run(Builtin::Save, &["f"], ".\n", &env);
        assert!(res.is_ok());
        assert_eq!(fs::read_to_string(mount.path().join("f")).unwrap(), "");
    }

    #[test]
    fn test_save_reports_usage_and_create_failure() {
        let (_mount, env) = mounted_env();
        let (res, _) = run(Builtin::Save, &[], "", &env);
        assert_eq!(res.unwrap_err().to_string(), "Usage: save <filename>");

        let (res, out) = run(Builtin::Save, &["no/such/dir/f"], "x\n.\n", &env);
        assert!(out.is_empty());
        assert_eq!(
            res.unwrap_err().to_string(),
            "Cannot create file: no/such/dir/f (No such file or directory)"
        );
    }

    #[test]
    fn test_cd_changes_process_dir_and_defaults_to_root() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();
        let env = Environment::default();

        let target = canonical.to_string_lossy().into_owned();
        let (res, _) = run(Builtin::Cd, &[target.as_str()], "", &env);
        assert!(res.is_ok());
        assert_eq!(
            fs::canonicalize(env::current_dir().unwrap()).unwrap(),
            canonical
        );

        let (res, _) = run(Builtin::Cd, &[], "", &env);
        assert!(res.is_ok());
        assert_eq!(env::current_dir().unwrap(), PathBuf::from("/"));

        env::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_failure_is_reported() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let env = Environment::default();
        let (res, _) = run(Builtin::Cd, &["/no/such/place"], "", &env);
        assert_eq!(
            res.unwrap_err().to_string(),
            "cd: /no/such/place: No such file or directory"
        );
        assert_eq!(env::current_dir().unwrap(), orig);
    }
}
