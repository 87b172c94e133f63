use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::quote;
use std::env;
use std::path::{Path, PathBuf};

/// Expansions are written to disk only when this variable is set; its value is the target
/// directory, falling back to `./target` when empty.
const DUMP_ENV: &str = "MEMOIZE_MACRO_DUMP";

fn dump_root() -> Option<PathBuf> {
    let value = env::var_os(DUMP_ENV)?;
    if value.is_empty() {
        env::current_dir().ok().map(|dir| dir.join("target"))
    } else {
        Some(PathBuf::from(value))
    }
}

pub fn write_to_local_file(lines: Vec<String>, dir_name: &str, file_name: &str) {
    let Some(root) = dump_root() else { return };
    let dir_path = root.join("macros").join(dir_name);
    if let Err(e) = std::fs::create_dir_all(&dir_path) {
        eprintln!("Failed to create directory {:?}: {}", dir_path, e);
        return;
    }
    write_lines(&dir_path.join(file_name), &lines);
}

#[cfg(not(test))]
fn write_lines(full_path: &Path, lines: &[String]) {
    use std::fs::OpenOptions;
    use std::io::Write;

    if let Err(e) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(full_path)
        .and_then(|mut file| file.write_all(lines.join("\n").as_bytes()))
    {
        eprintln!("Failed to write to {:?}: {}", full_path, e);
    }
}

#[cfg(test)]
fn write_lines(_full_path: &Path, _lines: &[String]) {}

pub fn submit_fn_to_stream(stream: proc_macro2::TokenStream, dir: &str, fn_ident: &Ident, suffix: &str) -> TokenStream {
    let formatted_token_stream =
        match syn::parse2::<syn::File>(stream.clone()) {
            Ok(ast) => prettyplease::unparse(&ast),
            Err(_) => stream.to_string(),
        };

    write_to_local_file(vec![formatted_token_stream], dir, &format!("{}{}", fn_ident, suffix));

    quote! {
        #stream
    }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_creates_directory_only_when_enabled() {
        let root = env::temp_dir().join(format!("memoize-dump-{}", std::process::id()));
        env::set_var(DUMP_ENV, &root);
        write_to_local_file(vec!["fn f() {}".to_string()], "memoize", "f.rs");
        env::remove_var(DUMP_ENV);

        let dir = root.join("macros").join("memoize");
        assert!(dir.is_dir());
        assert!(!dir.join("f.rs").exists());
        std::fs::remove_dir_all(&root).unwrap();

        write_to_local_file(vec!["fn g() {}".to_string()], "memoize", "g.rs");
        assert!(!dir.exists());
    }
}
