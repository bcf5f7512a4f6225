//! Embedded browser page.
//!
//! Served for `/` and `/files`. The page is a pure consumer of the JSON
//! API: it fetches `/api/info` and `/api/files`, renders the table, and
//! does search, sort and multi-select entirely client-side. The server
//! treats it as an opaque byte blob.

/// Static HTML + script payload.
pub const BROWSER_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Skiff - File Browser</title>
<style>
  :root { color-scheme: dark; }
  body { font-family: system-ui, sans-serif; background: #111827; color: #e5e7eb; margin: 0; padding: 1rem; }
  .wrap { max-width: 64rem; margin: 0 auto; }
  header { display: flex; flex-wrap: wrap; gap: 1rem; align-items: center; justify-content: space-between; margin-bottom: 1rem; }
  h1 { font-size: 1.4rem; margin: 0; }
  input[type=search] { background: #1f2937; color: inherit; border: 1px solid #374151; border-radius: 8px; padding: .5rem .75rem; min-width: 16rem; }
  #toolbar { display: flex; gap: .5rem; align-items: center; margin-bottom: .75rem; flex-wrap: wrap; }
  #breadcrumbs { flex: 1; color: #9ca3af; font-size: .9rem; overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
  #breadcrumbs a { color: #a5b4fc; text-decoration: none; }
  button, select { background: #4f46e5; border: none; color: white; border-radius: 8px; padding: .5rem .9rem; cursor: pointer; font-size: .9rem; }
  button:disabled { background: #4b5563; cursor: not-allowed; }
  select { background: #1f2937; border: 1px solid #374151; }
  table { width: 100%; border-collapse: collapse; background: #1f2937; border-radius: 8px; overflow: hidden; }
  th, td { text-align: left; padding: .6rem .8rem; border-bottom: 1px solid #374151; }
  th { background: #111827; color: #9ca3af; font-size: .8rem; text-transform: uppercase; }
  tr:hover td { background: #273449; }
  td a { color: inherit; text-decoration: none; display: block; }
  .meta { color: #9ca3af; font-size: .8rem; }
  .dir { color: #a5b4fc; font-weight: 600; }
  #banner { display: none; background: #312e81; border: 1px solid #6366f1; border-radius: 12px; padding: 2rem; text-align: center; margin-bottom: 1rem; }
  .shared #banner { display: block; }
  .shared #browser, .shared #search { display: none; }
  #storage-link { display: none; }
  .empty { text-align: center; color: #6b7280; padding: 2rem; }
</style>
</head>
<body>
<div class="wrap">
  <header>
    <h1 id="title">Skiff</h1>
    <input type="search" id="search" placeholder="Search files...">
  </header>

  <div id="banner">
    <h2>Files Ready</h2>
    <p>Your download should start automatically.</p>
    <button id="download-all">Download All Files</button>
    <p><a id="storage-link" href="#">Browse full storage</a></p>
  </div>

  <div id="browser">
    <div id="toolbar">
      <nav id="breadcrumbs"></nav>
      <select id="sort-key">
        <option value="name">Name</option>
        <option value="last_modified">Date</option>
        <option value="size">Size</option>
      </select>
      <button id="sort-order">↓</button>
      <button id="download-selected" disabled>Download</button>
    </div>
    <table>
      <thead>
        <tr><th style="width:2rem"><input type="checkbox" id="select-all"></th><th>Name</th></tr>
      </thead>
      <tbody id="list"></tbody>
    </table>
  </div>
</div>

<script>
const state = {
  path: '',
  prefix: '',
  files: [],
  sortKey: 'name',
  sortOrder: 'asc',
  rootName: 'Skiff',
  shared: false,
};

const el = id => document.getElementById(id);

function encodePath(path) {
  return path.split('/').map(encodeURIComponent).join('/');
}

function formatBytes(bytes) {
  if (bytes === 0) return '0 B';
  const units = ['B', 'KB', 'MB', 'GB', 'TB'];
  const i = Math.floor(Math.log(bytes) / Math.log(1024));
  return (bytes / Math.pow(1024, i)).toFixed(i ? 1 : 0) + ' ' + units[i];
}

function formatDate(ts) {
  return new Date(ts * 1000).toLocaleString();
}

function triggerDownload(path) {
  const a = document.createElement('a');
  a.href = '/download/' + encodePath(path);
  a.download = path.split('/').pop();
  document.body.appendChild(a);
  a.click();
  a.remove();
}

function renderBreadcrumbs() {
  const parts = state.path ? state.path.split('/') : [];
  let html = '<a href="#" data-path="">' + state.rootName + '</a>';
  let acc = '';
  for (const part of parts) {
    acc += (acc ? '/' : '') + part;
    html += ' / <a href="#" data-path="' + acc + '">' + part + '</a>';
  }
  el('breadcrumbs').innerHTML = html;
}

function renderList() {
  const term = el('search').value.toLowerCase();
  let files = state.files.filter(f => !term || f.name.toLowerCase().includes(term));

  const dir = state.sortOrder === 'asc' ? 1 : -1;
  const cmp = (a, b) => {
    const ka = a[state.sortKey], kb = b[state.sortKey];
    const c = typeof ka === 'string'
      ? ka.localeCompare(kb, undefined, { numeric: true, sensitivity: 'base' })
      : ka - kb;
    return dir * (c || a.name.localeCompare(b.name));
  };
  const folders = files.filter(f => f.is_dir).sort(cmp);
  const plain = files.filter(f => !f.is_dir).sort(cmp);
  files = folders.concat(plain);

  let html = '';
  if (state.path) {
    const parent = state.path.slice(0, state.path.lastIndexOf('/') + 1).replace(/\/$/, '');
    html += '<tr><td></td><td><a href="#" data-nav="' + parent + '" class="dir">.. Parent Directory</a></td></tr>';
  }
  if (!files.length) {
    html += '<tr><td colspan="2" class="empty">No files found.</td></tr>';
  }
  for (const f of files) {
    const meta = f.is_dir ? formatDate(f.last_modified)
      : formatBytes(f.size) + ' · ' + formatDate(f.last_modified);
    html += '<tr>'
      + '<td><input type="checkbox" class="pick" data-path="' + f.path + '" data-dir="' + f.is_dir + '"></td>'
      + '<td><a href="#" data-' + (f.is_dir ? 'nav' : 'get') + '="' + f.path + '"'
      + (f.is_dir ? ' class="dir"' : '') + '>' + f.name
      + '<div class="meta">' + meta + '</div></a></td></tr>';
  }
  el('list').innerHTML = html;
  updateButton();
}

function updateButton() {
  const n = document.querySelectorAll('.pick:checked').length;
  el('download-selected').disabled = n === 0;
  el('download-selected').textContent = n ? 'Download (' + n + ')' : 'Download';
}

async function navigate(path) {
  const target = state.prefix + (state.prefix && path ? '/' : '') + path;
  const res = await fetch('/api/files/' + encodePath(target));
  if (!res.ok) return;
  state.files = await res.json();
  state.path = path;

  if (state.shared && !state.prefix) {
    state.files.forEach((f, i) => setTimeout(() => triggerDownload(f.path), 800 * (i + 1)));
  } else {
    renderBreadcrumbs();
    renderList();
  }
  el('select-all').checked = false;
}

el('search').addEventListener('input', renderList);
el('sort-key').addEventListener('change', e => { state.sortKey = e.target.value; renderList(); });
el('sort-order').addEventListener('click', () => {
  state.sortOrder = state.sortOrder === 'asc' ? 'desc' : 'asc';
  el('sort-order').textContent = state.sortOrder === 'asc' ? '↓' : '↑';
  renderList();
});

document.addEventListener('click', e => {
  const link = e.target.closest('a');
  if (!link) return;
  if (link.dataset.nav !== undefined) { e.preventDefault(); navigate(link.dataset.nav); }
  else if (link.dataset.get !== undefined) { e.preventDefault(); triggerDownload(link.dataset.get); }
  else if (link.dataset.path !== undefined) { e.preventDefault(); navigate(link.dataset.path); }
});

el('select-all').addEventListener('change', e => {
  document.querySelectorAll('.pick').forEach(cb => { cb.checked = e.target.checked; });
  updateButton();
});
el('list').addEventListener('change', e => {
  if (e.target.classList.contains('pick')) updateButton();
});

el('download-selected').addEventListener('click', () => {
  const picked = [...document.querySelectorAll('.pick:checked')]
    .filter(cb => cb.dataset.dir !== 'true');
  picked.forEach((cb, i) => setTimeout(() => triggerDownload(cb.dataset.path), 600 * i));
});

el('download-all').addEventListener('click', () => {
  state.files.forEach((f, i) => setTimeout(() => triggerDownload(f.path), 800 * i));
});

el('storage-link').addEventListener('click', e => {
  e.preventDefault();
  state.prefix = '__storage__';
  document.body.classList.remove('shared');
  navigate('');
});

async function init() {
  try {
    const info = await (await fetch('/api/info')).json();
    state.rootName = info.root_folder_name;
    state.shared = info.is_shared_mode;
    el('title').textContent = info.root_folder_name;
    if (info.is_shared_mode) {
      document.body.classList.add('shared');
      if (!info.is_private) el('storage-link').style.display = 'inline';
    }
  } catch (e) { console.error('info fetch failed', e); }
  await navigate('');
}

document.addEventListener('DOMContentLoaded', init);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_references_wire_api() {
        assert!(BROWSER_PAGE.contains("/api/info"));
        assert!(BROWSER_PAGE.contains("/api/files/"));
        assert!(BROWSER_PAGE.contains("/download/"));
        assert!(BROWSER_PAGE.contains("__storage__"));
    }

    #[test]
    fn test_page_encodes_segments_individually() {
        // Client contract: each path segment is percent-encoded on its own.
        assert!(BROWSER_PAGE.contains("split('/').map(encodeURIComponent).join('/')"));
    }
}
