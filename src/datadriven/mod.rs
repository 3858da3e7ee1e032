//! Script-driven tests. A script is a sequence of cases:
//!
//! ```text
//! # comment
//! command arg=value arg=(v1, v2)
//! optional input lines
//! ----
//! expected output
//! <blank line>
//! ```

use std::{fs, path::Path, sync::OnceLock};

use regex::Regex;

use crate::error::{Error, Result};

#[derive(Default, Debug)]
pub struct TestData {
    pub pos: String,
    pub cmd: String,
    pub cmd_args: Vec<CmdArg>,
    pub input: String,
    pub expected: String,
}

#[derive(Debug)]
pub struct CmdArg {
    pub key: String,
    pub vals: Vec<String>,
}

impl CmdArg {
    pub fn string(&self, idx: usize) -> String {
        self.vals[idx].clone()
    }
    pub fn int64(&self, idx: usize) -> i64 {
        self.vals[idx].parse().unwrap()
    }
    pub fn uint64(&self, idx: usize) -> u64 {
        self.vals[idx].parse().unwrap()
    }
    pub fn bool(&self, idx: usize) -> bool {
        self.vals[idx].parse().unwrap()
    }
}

impl TestData {
    pub fn find_arg(&self, key: &str) -> Option<&CmdArg> {
        self.cmd_args.iter().find(|&f| f.key == key)
    }
    pub fn scan_args(&self, key: &str) -> &CmdArg {
        match self.find_arg(key) {
            Some(arg) => arg,
            None => panic!("{}: missing args: {}", self.pos, key),
        }
    }
    pub fn has_arg(&self, key: &str) -> bool {
        self.find_arg(key).is_some()
    }
}

pub fn run_test<F: FnMut(&TestData) -> String>(path: impl AsRef<Path>, f: F) {
    let path = path.as_ref();
    let content = fs::read_to_string(path).unwrap();
    run_cases(&content, &path.display().to_string(), f);
}

pub fn run_test_from_string<F: FnMut(&TestData) -> String>(input: impl AsRef<str>, f: F) {
    run_cases(input.as_ref(), "<string>", f);
}

fn run_cases<F: FnMut(&TestData) -> String>(input: &str, source: &str, mut f: F) {
    let datas = match parse_test_data(input, source) {
        Ok(datas) => datas,
        Err(e) => panic!("{}", e),
    };
    for data in datas.iter() {
        let actual = f(data);
        assert_eq!(actual, data.expected, "{}: {}", data.pos, data.cmd);
    }
}

pub fn parse_test_data(input: &str, source: &str) -> Result<Vec<TestData>> {
    let mut datas = Vec::new();
    let mut iter = input.lines().enumerate().peekable();

    while let Some((line_no, line)) = iter.next() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let pos = format!("{}:{}", source, line_no + 1);
        let fields = split_directive(line)
            .ok_or_else(|| Error::InvalidArgument(format!("{}: cannot parse directive: {}", pos, line)))?;

        let mut data = TestData {
            pos,
            cmd: fields[0].clone(),
            ..Default::default()
        };
        for arg in &fields[1..] {
            data.cmd_args.push(parse_arg(arg));
        }

        let mut input = String::new();
        let mut separator = false;
        for (_, line) in iter.by_ref() {
            if line == "----" {
                separator = true;
                break;
            }
            input.push_str(line);
            input.push('\n');
        }
        if !separator {
            return Err(Error::InvalidArgument(format!(
                "{}: missing separator after {}",
                data.pos, data.cmd
            )));
        }
        data.input = input.trim().to_owned();

        while let Some((_, line)) = iter.peek() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            data.expected.push_str(line);
            data.expected.push('\n');
            iter.next();
        }
        datas.push(data);
    }

    Ok(datas)
}

fn parse_arg(arg: &str) -> CmdArg {
    match arg.find('=') {
        Some(idx) => {
            let key = arg[0..idx].to_owned();
            let val = &arg[idx + 1..];
            let vals = if val.len() > 2 && val.starts_with('(') && val.ends_with(')') {
                val[1..val.len() - 1]
                    .split(',')
                    .map(|s| s.trim().to_owned())
                    .collect()
            } else {
                vec![val.to_owned()]
            };
            CmdArg { key, vals }
        }
        None => CmdArg {
            key: arg.to_owned(),
            vals: Vec::new(),
        },
    }
}

const PATTERN: &str = r"^ *[a-zA-Z0-9_/,-\.]+(|=[-a-zA-Z0-9_@]+|=\([^)]*\))( |$)";

fn split_directive(mut line: &str) -> Option<Vec<String>> {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    let p = DIRECTIVE.get_or_init(|| Regex::new(PATTERN).unwrap());

    let mut results = Vec::new();
    while !line.is_empty() {
        let m = p.find(line)?;
        line = &line[m.end()..];
        results.push(m.as_str().trim().to_string());
    }
    Some(results)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_split_directive() {
        let cmds = split_directive("insert max-level=4 keys=(3, 6, 7) verbose").unwrap();
        assert_eq!(cmds, vec!["insert", "max-level=4", "keys=(3, 6, 7)", "verbose"]);

        let arg = parse_arg(&cmds[2]);
        assert_eq!(arg.key, "keys");
        assert_eq!(arg.vals, vec!["3", "6", "7"]);
        assert_eq!(arg.string(1), "6");
        assert_eq!(parse_arg(&cmds[1]).uint64(0), 4);
        assert_eq!(parse_arg("key=-19").int64(0), -19);

        assert!(split_directive("bad arg=(unclosed").is_none());
    }

    #[test]
    fn test_from_string() {
        let input = r"
# each case sees the state left by the previous one
push v=3
----
depth 1

push v=(4, 5)
----
depth 3

pop
----
5
depth 2

# input lines are handed over trimmed
sum
ignored
----
7
";
        let mut stack: Vec<i64> = Vec::new();
        let mut cmds = Vec::new();
        run_test_from_string(input, |t| {
            cmds.push(t.cmd.clone());
            match t.cmd.as_str() {
                "push" => {
                    let arg = t.scan_args("v");
                    for i in 0..arg.vals.len() {
                        stack.push(arg.int64(i));
                    }
                    format!("depth {}\n", stack.len())
                }
                "pop" => {
                    let v = stack.pop().unwrap();
                    format!("{}\ndepth {}\n", v, stack.len())
                }
                "sum" => {
                    assert_eq!(t.input, "ignored");
                    format!("{}\n", stack.iter().sum::<i64>())
                }
                cmd => panic!("unknown command: {}", cmd),
            }
        });
        assert_eq!(cmds, vec!["push", "push", "pop", "sum"]);
    }

    #[test]
    #[should_panic(expected = "<string>:2")]
    fn test_mismatch_reports_position() {
        run_test_from_string("\necho\n----\nhello\n", |_| "goodbye\n".to_string());
    }

    #[test]
    fn test_multiple_cases() {
        let input = "
add a=1 b=2
----
3

neg v=5 verbose
----
-5

noop
----
";
        let datas = parse_test_data(input, "test").unwrap();
        assert_eq!(datas.len(), 3);
        assert_eq!(datas[0].pos, "test:2");
        assert_eq!(datas[0].expected, "3\n");
        assert!(datas[1].has_arg("verbose"));
        assert!(datas[1].scan_args("verbose").vals.is_empty());
        assert_eq!(datas[1].expected, "-5\n");
        assert_eq!(datas[2].cmd, "noop");
        assert_eq!(datas[2].expected, "");
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_test_data("cmd\ninput\n", "test").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_run_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "flip v=true\n----\nfalse\n\nflip v=false\n----\ntrue\n").unwrap();
        file.flush().unwrap();

        let mut seen = Vec::new();
        run_test(file.path(), |t| {
            let v = t.scan_args("v").bool(0);
            seen.push(v);
            format!("{}\n", !v)
        });
        assert_eq!(seen, vec![true, false]);
    }
}
