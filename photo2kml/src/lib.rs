//! Geotagged photo to KML export for photo2kml
//!
//! Expands a wildcard into photo paths, reads each photo's GPS position and
//! writes one camera marker per photo into a KML document. Clicking a marker
//! shows the photo itself.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use geotag::{locate, read_metadata, Coordinate};
use globwalk::{FileType, GlobWalkerBuilder};
use kml_doc::{image_popup, Document, IconStyle, Placemark, StyleMap};
use tracing::{debug, info, warn};

/// Photos picked up when no pattern is given
pub const DEFAULT_PATTERN: &str = "*.jpg";
pub const DEFAULT_OUTPUT: &str = "output.kml";
pub const CAMERA_ICON_HREF: &str = "http://maps.google.com/mapfiles/kml/shapes/camera.png";
pub const NORMAL_ICON_SCALE: f64 = 1.0;
pub const HIGHLIGHT_ICON_SCALE: f64 = 2.0;
pub const POPUP_IMAGE_HEIGHT: &str = "500px";

/// Settings for one export run
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Wildcard selecting the photos
    pub pattern: String,
    /// Where the KML document is written
    pub output: PathBuf,
    /// Marker icon in the unselected state
    pub icon_href: String,
    pub normal_scale: f64,
    /// The highlighted icon is the photo itself
    pub highlight_scale: f64,
    /// CSS height of the popup image
    pub popup_height: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            icon_href: CAMERA_ICON_HREF.to_string(),
            normal_scale: NORMAL_ICON_SCALE,
            highlight_scale: HIGHLIGHT_ICON_SCALE,
            popup_height: POPUP_IMAGE_HEIGHT.to_string(),
        }
    }
}

impl ExportConfig {
    /// Replace the default pattern when one is given
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        if let Some(pattern) = pattern {
            self.pattern = pattern;
        }
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }
}

/// Outcome of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Markers with a position
    pub placed: usize,
    /// Markers for photos without a GPS fix
    pub unplaced: usize,
    /// Files that could not be read as images
    pub skipped: usize,
}

impl ExportSummary {
    pub fn markers(&self) -> usize {
        self.placed + self.unplaced
    }
}

/// Expand `pattern` into a sorted list of files.
///
/// Wildcards apply to the components after the longest literal directory
/// prefix, and the walk goes no deeper than the pattern does. As in a shell,
/// a wildcard component only matches dotfiles when it starts with `.` itself,
/// and `**` is an ordinary `*`. Matching ignores case.
pub fn collect_photos(pattern: &str) -> Result<Vec<PathBuf>> {
    let (base, components) = split_pattern(pattern);
    let glob = walker_glob(&components);
    debug!("globbing {:?} under {} (depth {})", glob, base.display(), components.len());

    let walker = GlobWalkerBuilder::new(&base, &glob)
        .max_depth(components.len())
        .case_insensitive(true)
        .file_type(FileType::FILE)
        .build()
        .with_context(|| format!("Invalid photo pattern: {}", pattern))?;

    let mut paths = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if reveals_hidden(entry.path(), &base, &components) {
                    continue;
                }
                paths.push(display_path(entry.path(), &base));
            }
            Err(err) => warn!("Skipping unreadable entry: {}", err),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Marker for one photo: camera icon normally, the photo itself when
/// highlighted, and the photo inline in the popup
pub fn build_placemark(
    config: &ExportConfig,
    label: &str,
    coordinate: Option<Coordinate>,
) -> Placemark {
    Placemark::new(label, coordinate.map(|c| c.lon_lat()))
        .with_description(image_popup(label, &config.popup_height))
        .with_style_map(StyleMap::new(
            IconStyle::new(config.icon_href.as_str(), config.normal_scale),
            IconStyle::new(label, config.highlight_scale),
        ))
}

/// Read every photo in order and collect its marker. Files that fail to
/// open as images are skipped with a warning.
pub fn build_document(config: &ExportConfig, paths: &[PathBuf]) -> (Document, ExportSummary) {
    let mut document = Document::new();
    let mut summary = ExportSummary::default();

    for path in paths {
        let label = path.to_string_lossy();
        println!("Reading {}...", label);

        let metadata = match read_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Skipping {}: {:#}", label, err);
                summary.skipped += 1;
                continue;
            }
        };

        let coordinate = match locate(&metadata) {
            Ok(coordinate) => {
                debug!(
                    "{} at {}, {}",
                    label, coordinate.latitude, coordinate.longitude
                );
                summary.placed += 1;
                Some(coordinate)
            }
            Err(reason) => {
                warn!("No GPS fix for {} ({}); marker will not be placed", label, reason);
                summary.unplaced += 1;
                None
            }
        };

        document.add_placemark(build_placemark(config, &label, coordinate));
    }

    (document, summary)
}

/// Run a full export: expand the pattern, build the document and save it
pub fn export(config: &ExportConfig) -> Result<ExportSummary> {
    let paths = collect_photos(&config.pattern)?;
    if paths.is_empty() {
        warn!("No files match {}", config.pattern);
    }

    let (document, summary) = build_document(config, &paths);
    document.save(&config.output)?;

    info!(
        "Wrote {} markers ({} placed, {} without GPS, {} skipped) to {}",
        summary.markers(),
        summary.placed,
        summary.unplaced,
        summary.skipped,
        config.output.display()
    );
    Ok(summary)
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

/// Split a pattern into its literal base dir and the wildcard components
fn split_pattern(pattern: &str) -> (PathBuf, Vec<String>) {
    let mut base = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();

    for component in Path::new(pattern).components() {
        let text = component.as_os_str().to_string_lossy();
        if rest.is_empty() && !has_wildcard(&text) {
            base.push(component);
        } else {
            rest.push(text.into_owned());
        }
    }

    // A pattern without wildcards names a file; match it in its parent
    if rest.is_empty() {
        if let Some(name) = base.file_name() {
            rest.push(name.to_string_lossy().into_owned());
            base.pop();
        }
    }
    if base.as_os_str().is_empty() {
        base = PathBuf::from(".");
    }

    (base, rest)
}

/// Join wildcard components into the gitignore-style glob `globwalk` takes
fn walker_glob(components: &[String]) -> String {
    let glob = components
        .iter()
        .map(|component| collapse_stars(component))
        .collect::<Vec<_>>()
        .join("/");

    // A leading `!` negates and a leading `#` comments out a gitignore line
    if glob.starts_with(['!', '#']) {
        format!("\\{}", glob)
    } else {
        glob
    }
}

/// Runs of `*` match within one component only
fn collapse_stars(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for ch in component.chars() {
        if ch == '*' && out.ends_with('*') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Whether a walked path has a dot-named component its pattern does not
/// spell out with a leading `.`
fn reveals_hidden(path: &Path, base: &Path, components: &[String]) -> bool {
    let Ok(relative) = path.strip_prefix(base) else {
        return false;
    };
    relative
        .components()
        .zip(components)
        .any(|(name, pattern)| {
            name.as_os_str().to_string_lossy().starts_with('.') && !pattern.starts_with('.')
        })
}

/// Paths under the implicit "." base are shown relative, like a shell glob
fn display_path(path: &Path, base: &Path) -> PathBuf {
    let implicit = base.components().all(|c| c == Component::CurDir);
    match path.strip_prefix(".") {
        Ok(relative) if implicit => relative.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parts(components: &[&str]) -> Vec<String> {
        components.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_split_pattern() {
        assert_eq!(split_pattern("*.jpg"), (PathBuf::from("."), parts(&["*.jpg"])));
        assert_eq!(
            split_pattern("trip/day1/*.JPG"),
            (PathBuf::from("trip/day1"), parts(&["*.JPG"]))
        );
        assert_eq!(
            split_pattern("trip/day*/*.jpg"),
            (PathBuf::from("trip"), parts(&["day*", "*.jpg"]))
        );
        assert_eq!(
            split_pattern("/data/photos/*.jpg"),
            (PathBuf::from("/data/photos"), parts(&["*.jpg"]))
        );
        assert_eq!(
            split_pattern("trip/pier.jpg"),
            (PathBuf::from("trip"), parts(&["pier.jpg"]))
        );
        assert_eq!(
            split_pattern("pier.jpg"),
            (PathBuf::from("."), parts(&["pier.jpg"]))
        );
    }

    #[test]
    fn test_walker_glob() {
        assert_eq!(walker_glob(&parts(&["*.jpg"])), "*.jpg");
        assert_eq!(walker_glob(&parts(&["day*", "*.jpg"])), "day*/*.jpg");
        assert_eq!(walker_glob(&parts(&["**", "*.jpg"])), "*/*.jpg");
        assert_eq!(walker_glob(&parts(&["a***b.jpg"])), "a*b.jpg");
        assert_eq!(walker_glob(&parts(&["!odd.jpg"])), "\\!odd.jpg");
        assert_eq!(walker_glob(&parts(&["#1.jpg"])), "\\#1.jpg");
        assert_eq!(walker_glob(&parts(&["[!a]*.jpg"])), "[!a]*.jpg");
    }

    #[test]
    fn test_display_path() {
        assert_eq!(
            display_path(Path::new("./a.jpg"), Path::new(".")),
            PathBuf::from("a.jpg")
        );
        assert_eq!(
            display_path(Path::new("trip/a.jpg"), Path::new("trip")),
            PathBuf::from("trip/a.jpg")
        );
    }

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();

        assert_eq!(config.pattern, "*.jpg");
        assert_eq!(config.output, PathBuf::from("output.kml"));
        assert_eq!(config.icon_href, CAMERA_ICON_HREF);
        assert_eq!(config.normal_scale, 1.0);
        assert_eq!(config.highlight_scale, 2.0);

        let config = ExportConfig::default().with_pattern(None);
        assert_eq!(config.pattern, "*.jpg");
        let config = ExportConfig::default().with_pattern(Some("trip/*.jpeg".into()));
        assert_eq!(config.pattern, "trip/*.jpeg");
    }

    #[test]
    fn test_collect_photos_is_sorted_and_shallow() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::write(root.join("b.jpg"), b"")?;
        fs::write(root.join("a.JPG"), b"")?;
        fs::write(root.join("notes.txt"), b"")?;
        fs::create_dir(root.join("nested"))?;
        fs::write(root.join("nested").join("c.jpg"), b"")?;
        fs::create_dir(root.join("dir.jpg"))?;

        let paths = collect_photos(&format!("{}/*.jpg", root.display()))?;

        assert_eq!(paths, vec![root.join("a.JPG"), root.join("b.jpg")]);
        Ok(())
    }

    #[test]
    fn test_collect_photos_nested_pattern() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::create_dir(root.join("day1"))?;
        fs::create_dir(root.join("day2"))?;
        fs::write(root.join("day1").join("x.jpg"), b"")?;
        fs::write(root.join("day2").join("y.jpg"), b"")?;
        fs::write(root.join("top.jpg"), b"")?;

        let paths = collect_photos(&format!("{}/day*/*.jpg", root.display()))?;

        assert_eq!(
            paths,
            vec![root.join("day1").join("x.jpg"), root.join("day2").join("y.jpg")]
        );
        Ok(())
    }

    #[test]
    fn test_collect_photos_skips_dotfiles() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::write(root.join("a.jpg"), b"")?;
        fs::write(root.join(".hidden.jpg"), b"")?;
        fs::write(root.join("._a.jpg"), b"")?;
        fs::create_dir(root.join(".trash"))?;
        fs::write(root.join(".trash").join("old.jpg"), b"")?;

        let paths = collect_photos(&format!("{}/*.jpg", root.display()))?;
        assert_eq!(paths, vec![root.join("a.jpg")]);

        let paths = collect_photos(&format!("{}/*/*.jpg", root.display()))?;
        assert!(paths.is_empty());

        // a pattern that starts with a dot asks for them
        let paths = collect_photos(&format!("{}/.*.jpg", root.display()))?;
        assert_eq!(paths, vec![root.join("._a.jpg"), root.join(".hidden.jpg")]);

        let paths = collect_photos(&format!("{}/.trash/*.jpg", root.display()))?;
        assert_eq!(paths, vec![root.join(".trash").join("old.jpg")]);
        Ok(())
    }

    #[test]
    fn test_collect_photos_literal_bang_and_hash() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::write(root.join("!odd.jpg"), b"")?;
        fs::write(root.join("#1.jpg"), b"")?;
        fs::write(root.join("b.jpg"), b"")?;

        let paths = collect_photos(&format!("{}/!odd.jpg", root.display()))?;
        assert_eq!(paths, vec![root.join("!odd.jpg")]);

        let paths = collect_photos(&format!("{}/#1.jpg", root.display()))?;
        assert_eq!(paths, vec![root.join("#1.jpg")]);

        let paths = collect_photos(&format!("{}/*.jpg", root.display()))?;
        assert_eq!(
            paths,
            vec![root.join("!odd.jpg"), root.join("#1.jpg"), root.join("b.jpg")]
        );
        Ok(())
    }

    #[test]
    fn test_collect_photos_double_star_is_one_level() -> Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::write(root.join("top.jpg"), b"")?;
        fs::create_dir_all(root.join("sub").join("deeper"))?;
        fs::write(root.join("sub").join("c.jpg"), b"")?;
        fs::write(root.join("sub").join("deeper").join("d.jpg"), b"")?;

        let paths = collect_photos(&format!("{}/**/*.jpg", root.display()))?;

        assert_eq!(paths, vec![root.join("sub").join("c.jpg")]);
        Ok(())
    }

    #[test]
    fn test_collect_photos_no_match() -> Result<()> {
        let temp_dir = tempdir()?;

        let paths = collect_photos(&format!("{}/*.jpg", temp_dir.path().display()))?;

        assert!(paths.is_empty());
        Ok(())
    }

    #[test]
    fn test_build_placemark() {
        let config = ExportConfig::default();
        let placemark = build_placemark(&config, "pier.jpg", Some(Coordinate::new(37.8, -122.5)));

        assert_eq!(placemark.name(), "pier.jpg");
        assert_eq!(placemark.coordinates(), Some((-122.5, 37.8)));
        assert_eq!(
            placemark.description(),
            Some(r#"<img src="pier.jpg" height="500px" />"#)
        );
        let styles = placemark.style_map().unwrap();
        assert_eq!(styles.normal, IconStyle::new(CAMERA_ICON_HREF, 1.0));
        assert_eq!(styles.highlight, IconStyle::new("pier.jpg", 2.0));
    }

    #[test]
    fn test_non_images_are_skipped() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        fs::write(&path, b"not a jpeg").unwrap();

        let (document, summary) = build_document(&ExportConfig::default(), &[path]);

        assert!(document.placemarks().is_empty());
        assert_eq!(
            summary,
            ExportSummary {
                placed: 0,
                unplaced: 0,
                skipped: 1
            }
        );
    }
}
