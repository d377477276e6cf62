//! Browser runtime served as `register.js`.
//!
//! Generated icon modules import `registerSymbol` from here. It implements the
//! same registry as [`crate::registry`] against the real DOM. Every registry
//! transition is exercised by the registry tests; the table in this module's
//! tests pins the statement that carries each one on the JavaScript side, so
//! a change to either side shows up as a failing pair.

/// Expression naming the container host. Appears exactly once in
/// [`REGISTER_MODULE`] so a configured selector can replace it.
pub const HOST_EXPRESSION: &str = "document.body";

/// Source of the registry runtime module.
pub const REGISTER_MODULE: &str = r#"const SVG_NS = 'http://www.w3.org/2000/svg';
const CONTAINER_STYLE = 'position:absolute;width:0;height:0;overflow:hidden';
const noop = () => {};

let sprite = null;
const liveIds = new Map();

function resolveHost() {
  const host = document.body;
  if (!host) {
    console.warn('[svg-sprite] sprite container host not found');
    return null;
  }

  const shadow = host.shadowRoot;
  return {
    scope: shadow || document,
    parent: shadow ? shadow.querySelector('body') || shadow : host,
  };
}

function createSprite() {
  const root = document.createElementNS(SVG_NS, 'svg');
  root.setAttribute('style', CONTAINER_STYLE);
  root.setAttribute('aria-hidden', 'true');

  if (document.readyState === 'loading') {
    const created = { root, scope: document, pending: true };
    document.addEventListener(
      'DOMContentLoaded',
      () => {
        created.pending = false;
        const target = resolveHost();
        if (target) {
          created.scope = target.scope;
          target.parent.insertBefore(root, target.parent.firstChild);
        }
      },
      { once: true },
    );
    return created;
  }

  const target = resolveHost();
  if (!target) {
    return null;
  }
  target.parent.insertBefore(root, target.parent.firstChild);
  return { root, scope: target.scope, pending: false };
}

function ensureSprite() {
  if (sprite && (sprite.pending || sprite.root.isConnected)) {
    return sprite;
  }
  const created = createSprite();
  if (!created) {
    return null;
  }
  sprite = created;
  liveIds.clear();
  return sprite;
}

function isLive(id, root) {
  const fragments = liveIds.get(id);
  if (!fragments) {
    return false;
  }
  for (const fragment of fragments) {
    if (fragment.parentNode !== root) {
      fragments.delete(fragment);
    }
  }
  return fragments.size > 0;
}

function release(id, fragment) {
  const fragments = liveIds.get(id);
  if (fragments) {
    fragments.delete(fragment);
    if (fragments.size === 0) {
      liveIds.delete(id);
    }
  }
}

export function registerSymbol(symbol, id) {
  if (typeof document === 'undefined') {
    return { mount: noop, unmount: noop };
  }

  let fragment = null;

  function mount() {
    const current = ensureSprite();
    if (!current) {
      return;
    }

    if (fragment) {
      if (fragment.parentNode === current.root) {
        return;
      }
      fragment.remove();
      release(id, fragment);
      fragment = null;
    }

    if (isLive(id, current.root) || current.scope.getElementById(id)) {
      console.warn(`Icon #${id} was repeatedly registered. It must be globally unique.`);
    }

    current.root.insertAdjacentHTML('beforeend', symbol);
    fragment = current.root.lastChild;
    if (!liveIds.has(id)) {
      liveIds.set(id, new Set());
    }
    liveIds.get(id).add(fragment);
  }

  function unmount() {
    if (!fragment) {
      return;
    }
    fragment.remove();
    release(id, fragment);
    fragment = null;
  }

  return { mount, unmount };
}

export function addSymbol(symbol, id) {
  const { mount, unmount } = registerSymbol(symbol, id);
  mount();
  return unmount;
}

export default registerSymbol;
"#;

/// Replace the container host with the first element matching `selector`.
pub fn rewrite_container(source: &str, selector: &str) -> String {
    let literal = serde_json::Value::String(selector.to_string());
    source.replacen(
        HOST_EXPRESSION,
        &format!("document.querySelector({literal})"),
        1,
    )
}

/// The runtime module, optionally targeting a container selector.
pub fn register_module(container_selector: Option<&str>) -> String {
    match container_selector {
        Some(selector) => rewrite_container(REGISTER_MODULE, selector),
        None => REGISTER_MODULE.to_string(),
    }
}
