//! Chat page served at `/`.
//!
//! One static document: a model picker, a text box and a Submit button that
//! posts to `/api/chat` and appends the exchange below the form.

use axum::response::Html;

const CHAT_PAGE_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Healthcare Assistant Chatbot</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0f0f0f; color: #e0e0e0;
      display: flex; justify-content: center; padding: 3rem 1rem;
    }
    main { width: 100%; max-width: 720px; }
    h1 { font-size: 1.8rem; margin-bottom: 0.5rem; }
    .lead { margin-bottom: 1.5rem; }
    label { display: block; font-size: 0.9rem; color: #aaa; margin: 1rem 0 0.35rem; }
    select, input {
      width: 100%; padding: 0.6rem 0.75rem;
      border: 1px solid #333; border-radius: 8px;
      background: #1a1a1a; color: #e0e0e0; font-size: 1rem;
    }
    button {
      margin-top: 1rem; padding: 0.5rem 1.5rem;
      border: none; border-radius: 8px;
      background: #2a2a3a; color: #c0c0e0; font-size: 0.95rem; cursor: pointer;
    }
    button:hover { background: #3a3a5a; }
    button:disabled { opacity: 0.5; cursor: wait; }
    #status { margin-top: 1rem; color: #888; min-height: 1.2rem; }
    #log p { margin-top: 0.75rem; line-height: 1.45; white-space: pre-wrap; }
    #log p.error { color: #e08080; }
  </style>
</head>
<body>
  <main>
    <h1>Healthcare Assistant Chatbot</h1>
    <p class="lead">🤖 <strong>Ask me any medical question!</strong></p>

    <label for="model">Choose a Model:</label>
    <select id="model"></select>

    <form id="chat">
      <label for="message">How can I assist you today?</label>
      <input id="message" autocomplete="off" />
      <button id="submit" type="submit">Submit</button>
    </form>

    <div id="status"></div>
    <div id="log"></div>
  </main>
  <script>
    const modelEl = document.getElementById("model");
    const form = document.getElementById("chat");
    const input = document.getElementById("message");
    const button = document.getElementById("submit");
    const statusEl = document.getElementById("status");
    const log = document.getElementById("log");

    function append(text, cls) {
      const p = document.createElement("p");
      p.textContent = text;
      if (cls) p.className = cls;
      log.appendChild(p);
    }

    fetch("/api/models").then(r => r.json()).then(data => {
      for (const m of data.models) {
        const opt = document.createElement("option");
        opt.value = m.label;
        opt.textContent = m.label;
        opt.selected = m.label === data.default;
        modelEl.appendChild(opt);
      }
    });

    form.addEventListener("submit", async (ev) => {
      ev.preventDefault();
      const message = input.value;
      if (!message) {
        statusEl.textContent = "⚠️ Please enter a message to get a response.";
        return;
      }
      append("🧑‍💻 User:  " + message);
      statusEl.textContent = "Processing your queries Please wait.......";
      button.disabled = true;
      try {
        const resp = await fetch("/api/chat", {
          method: "POST",
          headers: { "Content-Type": "application/json" },
          body: JSON.stringify({ message, model: modelEl.value }),
        });
        const data = await resp.json();
        if (resp.ok) {
          append("🤖 Healthcare Assistant :  " + data.reply, data.is_error ? "error" : "");
        } else {
          append(data.message || ("HTTP " + resp.status), "error");
        }
      } catch (e) {
        append("request failed: " + e, "error");
      } finally {
        statusEl.textContent = "";
        button.disabled = false;
      }
    });
  </script>
</body>
</html>
"#;

/// GET / — chat page.
pub(super) async fn root() -> Html<&'static str> {
    Html(CHAT_PAGE_HTML)
}
