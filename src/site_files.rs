//! Starter content for a site's mount source directory.
//!
//! The directory is created on demand and each starter file is written only
//! when absent, so operator content is never replaced.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::error::FilesystemError;
use crate::template::SiteTemplate;

/// Host directory that backs a site's document root.
#[must_use]
pub fn site_directory(base_dir: &Utf8Path, domain: &str) -> Utf8PathBuf {
    base_dir.join(domain)
}

/// Create `site_dir` and write starter files for `template`.
///
/// Returns the names of the files written in this call.
///
/// # Errors
///
/// Returns `FilesystemError` when the directory cannot be created or opened,
/// or a starter file cannot be written.
pub fn seed_site_content(
    site_dir: &Utf8Path,
    domain: &str,
    template: SiteTemplate,
    port: u16,
) -> Result<Vec<&'static str>, FilesystemError> {
    Dir::create_ambient_dir_all(site_dir, ambient_authority())
        .map_err(|error| map_io_error(site_dir, &error))?;
    let dir = Dir::open_ambient_dir(site_dir, ambient_authority())
        .map_err(|error| map_io_error(site_dir, &error))?;

    let mut written = Vec::new();
    for (file_name, content) in starter_files(site_dir, domain, template, port)? {
        if dir.exists(file_name) {
            debug!(path = %site_dir.join(file_name), "starter file already present");
            continue;
        }
        dir.write(file_name, content)
            .map_err(|error| map_io_error(&site_dir.join(file_name), &error))?;
        written.push(file_name);
    }
    Ok(written)
}

fn starter_files(
    site_dir: &Utf8Path,
    domain: &str,
    template: SiteTemplate,
    port: u16,
) -> Result<Vec<(&'static str, String)>, FilesystemError> {
    Ok(match template {
        SiteTemplate::Static => vec![("index.html", static_page(domain))],
        SiteTemplate::Php => vec![("index.php", php_page(domain))],
        SiteTemplate::Node => vec![
            ("package.json", node_package_json(site_dir, domain)?),
            ("index.js", node_server(port)),
        ],
    })
}

fn static_page(domain: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{domain}</title>
  </head>
  <body>
    <h1>{domain}</h1>
    <p>Welcome to your Docklite site.</p>
  </body>
</html>
"#
    )
}

fn php_page(domain: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{domain}</title>
  </head>
  <body>
    <h1>{domain}</h1>
    <p><?php echo "PHP is running."; ?></p>
  </body>
</html>
"#
    )
}

fn node_package_json(site_dir: &Utf8Path, domain: &str) -> Result<String, FilesystemError> {
    let manifest = serde_json::json!({
        "name": domain,
        "version": "1.0.0",
        "private": true,
        "scripts": { "start": "node index.js" },
    });
    let mut rendered =
        serde_json::to_string_pretty(&manifest).map_err(|error| FilesystemError::IoError {
            path: site_dir.join("package.json").into_std_path_buf(),
            message: format!("failed to render package.json: {error}"),
        })?;
    rendered.push('\n');
    Ok(rendered)
}

fn node_server(port: u16) -> String {
    format!(
        r"const http = require('http');

const port = process.env.PORT || {port};

const server = http.createServer((req, res) => {{
  res.writeHead(200, {{ 'Content-Type': 'text/html' }});
  res.end('<h1>Docklite Node Site</h1><p>Server is running.</p>');
}});

server.listen(port, () => {{
  console.log('Server running on port', port);
}});
"
    )
}

fn map_io_error(path: &Utf8Path, error: &std::io::Error) -> FilesystemError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        FilesystemError::PermissionDenied {
            path: path.as_std_path().to_path_buf(),
        }
    } else {
        FilesystemError::IoError {
            path: path.as_std_path().to_path_buf(),
            message: error.to_string(),
        }
    }
}
