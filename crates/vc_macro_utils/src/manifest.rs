use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item, Table};

/// The dependency tables of the Cargo.toml of the crate invoking a macro.
///
/// Generated code must name the runtime crate the way the invoking crate sees it:
/// `::vc_serial` for direct users, `::vc_poly::serial` for users of the facade.
///
/// # Example
///
/// ```rust
/// # use vc_macro_utils::Manifest;
/// let path: syn::Path = Manifest::shared(|m| m.get_crate_path("vc_serial"));
/// assert_eq!(path.segments.last().unwrap().ident, "vc_serial");
/// ```
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the name begins with `vc_` and the facade `vc_poly` is listed, return
///    `::vc_poly::short_name` (e.g. `vc_serial` -> `::vc_poly::serial`).
/// 3. Repeat step 1-2 in `dev-dependencies`.
/// 4. Otherwise, fall back to the absolute path `::crate_name`.
///
/// Renamed dependencies (`package = "..."`) are matched by their key, which is
/// the name visible in code.
///
/// A crate using the macros on its own types should add
/// `extern crate self as crate_name;` to its root so rule 4 resolves.
#[derive(Debug)]
pub struct Manifest {
    dependencies: Option<Table>,
    dev_dependencies: Option<Table>,
    modified_time: Option<SystemTime>,
}

const FACADE_NAME: &str = "vc_poly";
const CRATE_PREFIX: &str = "vc_";

impl Manifest {
    fn manifest_path() -> Option<PathBuf> {
        let mut path = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR")?);
        path.push("Cargo.toml");
        Some(path)
    }

    fn modified_time(path: &PathBuf) -> Option<SystemTime> {
        std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
    }

    /// An unreadable or invalid manifest resolves every name by rule 4,
    /// the compiler then reports the real problem.
    fn read(path: &PathBuf, modified_time: Option<SystemTime>) -> Self {
        let document = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| Document::parse(text).ok());

        let table = |key: &str| match document.as_ref().and_then(|doc| doc.get(key)) {
            Some(Item::Table(table)) => Some(table.clone()),
            _ => None,
        };

        Self {
            dependencies: table("dependencies"),
            dev_dependencies: table("dev-dependencies"),
            modified_time,
        }
    }

    fn absolute(segments: &[&str]) -> syn::Path {
        let mut path = syn::Path {
            leading_colon: Some(Default::default()),
            segments: Default::default(),
        };
        for segment in segments {
            path.segments
                .push(syn::Ident::new(segment, proc_macro2_span()).into());
        }
        path
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Some(Self::absolute(&[name]));
        }
        match name.strip_prefix(CRATE_PREFIX) {
            Some(module) if deps.contains_key(FACADE_NAME) => {
                Some(Self::absolute(&[FACADE_NAME, module]))
            }
            _ => None,
        }
    }

    /// Return a [`syn::Path`] for the package named `name` as seen from the
    /// invoking crate. See the type documentation for the resolution order.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        [&self.dependencies, &self.dev_dependencies]
            .into_iter()
            .flatten()
            .find_map(|deps| Self::find_in_deps(deps, name))
            .unwrap_or_else(|| Self::absolute(&[name]))
    }

    /// Runs `func` on the cached manifest of the invoking crate.
    ///
    /// The manifest is read again when its modification time changes.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let Some(path) = Self::manifest_path() else {
            return func(&Self::read(&PathBuf::new(), None));
        };
        let modified_time = Self::modified_time(&path);

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(manifest) = manifests.get(&path)
            && manifest.modified_time.is_some()
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }
        drop(manifests);

        let manifest = Self::read(&path, modified_time);
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, manifest);

        result
    }
}

#[inline]
fn proc_macro2_span() -> proc_macro2::Span {
    proc_macro2::Span::call_site()
}

#[cfg(test)]
mod tests {
    use super::Manifest;

    fn manifest(text: &str) -> Manifest {
        let document: toml_edit::Document<String> = toml_edit::Document::parse(text.to_owned()).unwrap();
        let table = |key: &str| document.get(key).and_then(|item| item.as_table()).cloned();
        Manifest {
            dependencies: table("dependencies"),
            dev_dependencies: table("dev-dependencies"),
            modified_time: None,
        }
    }

    fn render(path: &syn::Path) -> String {
        let segments: Vec<_> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        format!("::{}", segments.join("::"))
    }

    #[test]
    fn direct_dependency() {
        let m = manifest("[dependencies]\nvc_serial = \"0.1\"\nvc_poly = \"0.1\"\n");
        assert_eq!(render(&m.get_crate_path("vc_serial")), "::vc_serial");
    }

    #[test]
    fn through_facade() {
        let m = manifest("[dev-dependencies]\nvc_poly = { path = \"..\" }\n");
        assert_eq!(render(&m.get_crate_path("vc_serial")), "::vc_poly::serial");
    }

    #[test]
    fn fallback() {
        let m = manifest("[package]\nname = \"x\"\n");
        assert_eq!(render(&m.get_crate_path("vc_serial")), "::vc_serial");
    }
}
