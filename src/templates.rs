//! HTML page generation
//!
//! Pure functions from parameters to markup strings, kept separate from the
//! route layer so pages can be tested without an HTTP server. All rendering
//! happens client-side: the viewer embeds PDF.js from a CDN and fetches the
//! stored file from the /pdf route.

use crate::storage::RecentFile;

/// PDF.js release pinned for the viewer and its worker.
const PDFJS_VERSION: &str = "3.11.174";

// ============================================================================
// Upload page
// ============================================================================

const UPLOAD_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    min-height: 100vh;
    display: flex;
    align-items: center;
    justify-content: center;
}

.upload-container {
    background: white;
    padding: 2rem;
    border-radius: 15px;
    box-shadow: 0 20px 40px rgba(0,0,0,0.1);
    text-align: center;
    max-width: 500px;
    width: 90%;
}

.upload-container h1 { color: #333; margin-bottom: 1rem; font-size: 2rem; }
.upload-container p { color: #666; margin-bottom: 1.5rem; }

.flash {
    background: #fdecea;
    color: #b71c1c;
    border: 1px solid #f5c6cb;
    border-radius: 6px;
    padding: 0.6rem 1rem;
    margin-bottom: 1rem;
    font-size: 0.9rem;
}

.file-input {
    margin-bottom: 1.5rem;
}

.file-input input[type="file"] {
    width: 100%;
    padding: 0.75rem;
    border: 2px dashed #667eea;
    border-radius: 8px;
    background: #f8f9ff;
    cursor: pointer;
}

.upload-btn {
    background: #667eea;
    color: white;
    border: none;
    padding: 0.75rem 2rem;
    border-radius: 8px;
    font-size: 1rem;
    cursor: pointer;
}

.upload-btn:hover { background: #5a6fd8; }

.recent-files {
    margin-top: 2rem;
    text-align: left;
}

.recent-files h2 {
    font-size: 1rem;
    color: #333;
    border-bottom: 1px solid #eee;
    padding-bottom: 0.4rem;
    margin-bottom: 0.6rem;
}

.recent-files ul { list-style: none; }

.recent-files li {
    padding: 0.35rem 0;
    display: flex;
    justify-content: space-between;
    gap: 1rem;
}

.recent-files a { color: #667eea; text-decoration: none; word-break: break-all; }
.recent-files a:hover { text-decoration: underline; }
.recent-files .date { color: #999; font-size: 0.8rem; white-space: nowrap; }
"#;

/// Render the upload form plus the recent-files listing.
pub fn upload_page(recent: &[RecentFile], flash: Option<&str>) -> String {
    let flash_html = flash
        .map(|msg| {
            format!(
                r#"<div class="flash">{}</div>"#,
                html_escape::encode_text(msg)
            )
        })
        .unwrap_or_default();

    let recent_html = if recent.is_empty() {
        String::new()
    } else {
        let items: String = recent
            .iter()
            .map(|file| {
                format!(
                    r#"<li><a href="/view/{href}">{name}</a><span class="date">{date}</span></li>"#,
                    href = urlencoding::encode(&file.name),
                    name = html_escape::encode_text(&file.display_name),
                    date = file.modified.format("%Y-%m-%d %H:%M"),
                )
            })
            .collect();
        format!(
            r#"<div class="recent-files"><h2>Recent files</h2><ul>{items}</ul></div>"#
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>PDF Viewer - Upload</title>
<style>{UPLOAD_STYLE}</style>
</head>
<body>
<div class="upload-container">
    <h1>PDF Viewer</h1>
    <p>Upload a PDF to view it and chat about its content.</p>
    {flash_html}
    <form method="post" action="/" enctype="multipart/form-data">
        <div class="file-input">
            <input type="file" name="file" accept=".pdf,application/pdf" required>
        </div>
        <button type="submit" class="upload-btn">Upload PDF</button>
    </form>
    {recent_html}
</div>
</body>
</html>
"#
    )
}

// ============================================================================
// Viewer page
// ============================================================================

const VIEWER_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: #2c2c2c;
    color: #fff;
    overflow: hidden;
    display: flex;
}

.header {
    background: #1e1e2e;
    padding: 0.3rem 0.8rem;
    position: fixed;
    top: 0; left: 0; right: 0;
    z-index: 1000;
    display: flex;
    justify-content: space-between;
    align-items: center;
    height: 40px;
    box-shadow: 0 1px 5px rgba(0,0,0,0.3);
}

.header-left, .header-right { display: flex; align-items: center; gap: 1rem; }

.back-btn {
    background: #667eea;
    color: white;
    padding: 6px 12px;
    border-radius: 4px;
    text-decoration: none;
    font-size: 0.9rem;
}
.back-btn:hover { background: #5a6fd8; }

.title { font-size: 1rem; font-weight: 500; }

.page-info {
    background: rgba(255,255,255,0.1);
    padding: 4px 12px;
    border-radius: 15px;
    font-size: 0.8rem;
}

.zoom-controls { display: flex; gap: 5px; }

.nav-btn, .zoom-btn {
    background: rgba(255,255,255,0.1);
    color: white;
    border: none;
    padding: 4px 8px;
    border-radius: 4px;
    cursor: pointer;
    font-size: 0.8rem;
}
.nav-btn:hover, .zoom-btn:hover { background: rgba(255,255,255,0.2); }

.progress-bar {
    position: fixed;
    top: 40px; left: 0;
    height: 2px;
    background: #667eea;
    transition: width 0.3s ease;
    z-index: 999;
}

.viewer-container {
    margin-top: 40px;
    padding: 0.5rem;
    display: flex;
    justify-content: center;
    min-height: calc(100vh - 40px);
    flex: 1;
    overflow: auto;
}

.pdf-container {
    background: #2f3349;
    border-radius: 6px;
    overflow: auto;
    display: flex;
    justify-content: center;
    align-items: center;
    padding: 10px;
    max-height: calc(100vh - 60px);
    width: 100%;
}

.pdf-page-container { position: relative; display: inline-block; }

#pdfCanvas { display: block; margin: 0 auto; }

.text-layer {
    position: absolute;
    left: 0; top: 0; right: 0; bottom: 0;
    overflow: hidden;
    line-height: 1.0;
    pointer-events: none;
}

.text-layer > span {
    color: transparent;
    position: absolute;
    white-space: pre;
    cursor: text;
    transform-origin: 0% 0%;
    pointer-events: auto;
    user-select: text;
}

.text-layer ::selection { background: rgba(0, 0, 255, 0.3); }

.loading { text-align: center; font-size: 1.2rem; padding: 3rem; }
.load-error { text-align: center; color: #ff8a80; font-size: 1rem; padding: 3rem; }

/* Chat panel */
.chat-panel {
    width: 300px;
    height: 100vh;
    background: #1e1e2e;
    border-right: 1px solid #3a3a4a;
    display: flex;
    flex-direction: column;
    transition: transform 0.3s ease;
    z-index: 500;
}

.chat-panel.collapsed { transform: translateX(-270px); }

.chat-header {
    padding: 0.6rem 0.8rem;
    display: flex;
    justify-content: space-between;
    align-items: center;
    border-bottom: 1px solid #3a3a4a;
    font-size: 0.9rem;
}

.chat-header button {
    background: none;
    border: none;
    color: #8888aa;
    cursor: pointer;
    font-size: 0.8rem;
}
.chat-header button:hover { color: #fff; }

.chat-messages {
    flex: 1;
    overflow-y: auto;
    padding: 0.8rem;
    display: flex;
    flex-direction: column;
    gap: 0.6rem;
}

.message {
    padding: 0.5rem 0.7rem;
    border-radius: 8px;
    font-size: 0.85rem;
    line-height: 1.4;
    max-width: 90%;
}

.message.user { background: #667eea; align-self: flex-end; }
.message.assistant { background: #3a3a4a; align-self: flex-start; }
.message.system { background: none; color: #8888aa; align-self: center; text-align: center; }

.chat-input-area {
    display: flex;
    gap: 0.4rem;
    padding: 0.6rem;
    border-top: 1px solid #3a3a4a;
}

.chat-input-area textarea {
    flex: 1;
    background: #2c2c3c;
    border: 1px solid #3a3a4a;
    border-radius: 6px;
    color: #fff;
    padding: 0.4rem 0.6rem;
    font-family: inherit;
    font-size: 0.85rem;
    resize: none;
}

.chat-input-area button {
    background: #667eea;
    color: white;
    border: none;
    border-radius: 6px;
    padding: 0.4rem 0.8rem;
    cursor: pointer;
    font-size: 0.85rem;
}
.chat-input-area button:disabled { opacity: 0.5; cursor: not-allowed; }
"#;

const VIEWER_SCRIPT: &str = r#"
pdfjsLib.GlobalWorkerOptions.workerSrc = window.FOLIO.workerUrl;

let pdfDoc = null;
let currentPage = 1;
let scale = 1.2;
let rendering = false;

const canvas = document.getElementById('pdfCanvas');
const ctx = canvas.getContext('2d');
const pageContainer = document.getElementById('pageContainer');

pdfjsLib.getDocument(window.FOLIO.pdfUrl).promise.then(function(pdf) {
    pdfDoc = pdf;
    document.getElementById('totalPages').textContent = pdf.numPages;
    document.getElementById('loading').remove();
    pageContainer.style.display = 'inline-block';
    renderPage(1);
}).catch(function(error) {
    const loading = document.getElementById('loading');
    loading.className = 'load-error';
    loading.textContent = 'Failed to load PDF: ' + error.message;
});

function renderPage(pageNum) {
    if (rendering) return;
    rendering = true;

    pdfDoc.getPage(pageNum).then(function(page) {
        const baseViewport = page.getViewport({scale: 1.0});
        // Render at double resolution, display at the zoom size.
        const renderViewport = page.getViewport({scale: scale * 2});

        canvas.width = renderViewport.width;
        canvas.height = renderViewport.height;
        const displayWidth = baseViewport.width * scale;
        const displayHeight = baseViewport.height * scale;
        canvas.style.width = displayWidth + 'px';
        canvas.style.height = displayHeight + 'px';

        const renderTask = page.render({canvasContext: ctx, viewport: renderViewport});

        const textLayerDiv = document.getElementById('textLayer');
        textLayerDiv.innerHTML = '';
        textLayerDiv.style.width = displayWidth + 'px';
        textLayerDiv.style.height = displayHeight + 'px';

        page.getTextContent().then(function(textContent) {
            const viewport = page.getViewport({scale: scale});
            pdfjsLib.renderTextLayer({
                textContentSource: textContent,
                container: textLayerDiv,
                viewport: viewport,
            }).promise.catch(function() {
                // Fallback: absolutely positioned spans from raw items.
                textContent.items.forEach(function(item) {
                    const tx = pdfjsLib.Util.transform(viewport.transform, item.transform);
                    const span = document.createElement('span');
                    span.textContent = item.str;
                    span.style.left = tx[4] + 'px';
                    span.style.top = (tx[5] - item.height * scale) + 'px';
                    span.style.fontSize = (item.height * scale) + 'px';
                    textLayerDiv.appendChild(span);
                });
            });
        });

        renderTask.promise.then(function() {
            currentPage = pageNum;
            document.getElementById('currentPage').textContent = pageNum;
            const progress = (pageNum / pdfDoc.numPages) * 100;
            document.getElementById('progressBar').style.width = progress + '%';
            updateCursor();
            rendering = false;
        }).catch(function() {
            rendering = false;
        });
    });
}

function nextPage() {
    if (pdfDoc && currentPage < pdfDoc.numPages) renderPage(currentPage + 1);
}

function prevPage() {
    if (pdfDoc && currentPage > 1) renderPage(currentPage - 1);
}

function zoomIn() {
    scale = Math.min(scale * 1.25, 3);
    updateZoomLevel();
    renderPage(currentPage);
}

function zoomOut() {
    scale = Math.max(scale * 0.8, 0.5);
    updateZoomLevel();
    renderPage(currentPage);
}

function resetZoom() {
    scale = 1.2;
    updateZoomLevel();
    renderPage(currentPage);
}

function updateZoomLevel() {
    document.getElementById('zoomLevel').textContent = Math.round(scale * 100) + '%';
}

document.addEventListener('keydown', function(e) {
    if (e.target.tagName === 'TEXTAREA' || e.target.tagName === 'INPUT') return;
    switch (e.key) {
        case 'ArrowRight': case 'PageDown': nextPage(); break;
        case 'ArrowLeft': case 'PageUp': prevPage(); break;
        case '+': case '=': zoomIn(); break;
        case '-': zoomOut(); break;
        case '0': resetZoom(); break;
    }
});

// Wheel turns pages when not zoomed in; zoomed pages scroll/pan instead.
document.querySelector('.viewer-container').addEventListener('wheel', function(e) {
    if (scale > 1.2 || !pdfDoc) return;
    e.preventDefault();
    if (e.deltaY > 0) nextPage(); else prevPage();
}, { passive: false });

// Drag-to-pan when zoomed in, unless the user is selecting text.
let dragging = false;
let dragStartX = 0, dragStartY = 0, scrollStartX = 0, scrollStartY = 0;
const pdfContainer = document.querySelector('.pdf-container');

pageContainer.addEventListener('mousedown', function(e) {
    if (scale <= 1.2 || e.target.closest('.text-layer')) return;
    dragging = true;
    dragStartX = e.clientX;
    dragStartY = e.clientY;
    scrollStartX = pdfContainer.scrollLeft;
    scrollStartY = pdfContainer.scrollTop;
    pageContainer.style.cursor = 'grabbing';
    e.preventDefault();
});

window.addEventListener('mousemove', function(e) {
    if (!dragging) return;
    pdfContainer.scrollLeft = scrollStartX - (e.clientX - dragStartX);
    pdfContainer.scrollTop = scrollStartY - (e.clientY - dragStartY);
});

window.addEventListener('mouseup', function() {
    if (!dragging) return;
    dragging = false;
    updateCursor();
});

function updateCursor() {
    pageContainer.style.cursor = scale > 1.2 ? 'grab' : 'default';
}

// Chat panel
let chatHistory = [];

function toggleChat() {
    document.getElementById('chatPanel').classList.toggle('collapsed');
}

function clearChat() {
    document.getElementById('chatMessages').innerHTML =
        '<div class="message system">Ask me about this PDF: questions, summaries, or selected text.</div>';
    chatHistory = [];
}

function addMessage(content, type) {
    const messages = document.getElementById('chatMessages');
    const div = document.createElement('div');
    div.className = 'message ' + type;
    div.textContent = content;
    messages.appendChild(div);
    messages.scrollTop = messages.scrollHeight;
}

function sendMessage() {
    const input = document.getElementById('chatInput');
    const sendBtn = document.getElementById('chatSend');
    const message = input.value.trim();
    if (!message) return;

    addMessage(message, 'user');
    chatHistory.push({role: 'user', content: message});
    input.value = '';
    sendBtn.disabled = true;
    sendBtn.textContent = '...';

    const context = {
        filename: window.FOLIO.filename,
        currentPage: currentPage,
        totalPages: pdfDoc ? pdfDoc.numPages : 0,
        selectedText: window.getSelection().toString()
    };

    fetch('/chat', {
        method: 'POST',
        headers: {'Content-Type': 'application/json'},
        body: JSON.stringify({message: message, history: chatHistory, context: context})
    })
    .then(function(res) { return res.json(); })
    .then(function(data) {
        if (typeof data.response === 'string') {
            addMessage(data.response, 'assistant');
            chatHistory.push({role: 'assistant', content: data.response});
        } else {
            addMessage(data.message || 'Sorry, something went wrong. Please try again.', 'system');
        }
    })
    .catch(function() {
        addMessage('Sorry, something went wrong. Please try again.', 'system');
    })
    .finally(function() {
        sendBtn.disabled = false;
        sendBtn.textContent = 'Send';
    });
}

document.getElementById('chatInput').addEventListener('keydown', function(e) {
    if (e.key === 'Enter' && !e.shiftKey) {
        e.preventDefault();
        sendMessage();
    }
});
"#;

/// Render the viewer page for a stored file.
///
/// Existence is not checked here: a missing file surfaces as a client-side
/// fetch failure shown in the viewer.
pub fn viewer_page(stored_name: &str, display_name: &str) -> String {
    let pdfjs_url = format!(
        "https://cdnjs.cloudflare.com/ajax/libs/pdf.js/{PDFJS_VERSION}/pdf.min.js"
    );
    let worker_url = format!(
        "https://cdnjs.cloudflare.com/ajax/libs/pdf.js/{PDFJS_VERSION}/pdf.worker.min.js"
    );

    // json! gives properly quoted JS string literals, but leaves `</`
    // intact, which would terminate the inline script block. JSON accepts
    // the escaped form, so rewrite it after serialization.
    let page_config = serde_json::json!({
        "pdfUrl": format!("/pdf/{}", urlencoding::encode(stored_name)),
        "workerUrl": worker_url,
        "filename": display_name,
    })
    .to_string()
    .replace("</", r"<\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>PDF Viewer - {title}</title>
<style>{VIEWER_STYLE}</style>
</head>
<body>
<div class="chat-panel" id="chatPanel">
    <div class="chat-header">
        <span>PDF Assistant</span>
        <div>
            <button onclick="clearChat()">clear</button>
            <button onclick="toggleChat()">hide</button>
        </div>
    </div>
    <div class="chat-messages" id="chatMessages">
        <div class="message system">Ask me about this PDF: questions, summaries, or selected text.</div>
    </div>
    <div class="chat-input-area">
        <textarea id="chatInput" rows="2" placeholder="Ask about this PDF..."></textarea>
        <button id="chatSend" onclick="sendMessage()">Send</button>
    </div>
</div>
<div style="flex: 1">
    <div class="header">
        <div class="header-left">
            <a href="/" class="back-btn">&larr; Back</a>
            <span class="title">{title}</span>
        </div>
        <div class="header-right">
            <button class="nav-btn" onclick="prevPage()">&larr; Prev</button>
            <div class="page-info">Page <span id="currentPage">1</span> of <span id="totalPages">?</span></div>
            <button class="nav-btn" onclick="nextPage()">Next &rarr;</button>
            <div class="zoom-controls">
                <button class="zoom-btn" onclick="zoomOut()">&minus;</button>
                <button class="zoom-btn" onclick="resetZoom()"><span id="zoomLevel">120%</span></button>
                <button class="zoom-btn" onclick="zoomIn()">+</button>
            </div>
        </div>
    </div>
    <div class="progress-bar" id="progressBar"></div>
    <div class="viewer-container">
        <div class="pdf-container">
            <div class="loading" id="loading">Loading PDF...</div>
            <div class="pdf-page-container" id="pageContainer" style="display: none">
                <canvas id="pdfCanvas"></canvas>
                <div class="text-layer" id="textLayer"></div>
            </div>
        </div>
    </div>
</div>
<script src="{pdfjs_url}"></script>
<script>window.FOLIO = {page_config};</script>
<script>{VIEWER_SCRIPT}</script>
</body>
</html>
"#,
        title = html_escape::encode_text(display_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn upload_page_lists_recent_files_with_viewer_links() {
        let recent = vec![RecentFile {
            name: "abc_report v2.pdf".to_string(),
            display_name: "report <v2>.pdf".to_string(),
            modified: Utc::now(),
        }];

        let html = upload_page(&recent, None);
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains("/view/abc_report%20v2.pdf"));
        // Display names are HTML-escaped.
        assert!(html.contains("report &lt;v2&gt;.pdf"));
        assert!(!html.contains("report <v2>.pdf"));
    }

    #[test]
    fn upload_page_shows_flash_message() {
        let html = upload_page(&[], Some("Invalid file type"));
        assert!(html.contains(r#"<div class="flash">Invalid file type</div>"#));
    }

    #[test]
    fn upload_page_omits_recent_section_when_empty() {
        let html = upload_page(&[], None);
        assert!(!html.contains("Recent files"));
    }

    #[test]
    fn viewer_page_wires_pdfjs_to_the_stored_file() {
        let html = viewer_page("abc_report.pdf", "report.pdf");
        assert!(html.contains("pdf.js/3.11.174/pdf.min.js"));
        assert!(html.contains("pdf.worker.min.js"));
        assert!(html.contains(r#""pdfUrl":"/pdf/abc_report.pdf""#));
        assert!(html.contains("fetch('/chat'"));
        assert!(html.contains("selectedText"));
        assert!(html.contains("renderTextLayer"));
    }

    #[test]
    fn viewer_page_escapes_display_name() {
        let html = viewer_page("abc_a.pdf", "a<script>.pdf");
        assert!(!html.contains("<title>PDF Viewer - a<script>"));
        assert!(html.contains("a&lt;script&gt;.pdf"));
    }

    #[test]
    fn viewer_page_config_cannot_terminate_the_script_block() {
        let html = viewer_page("x.pdf", "x</script><script>alert(1)</script>");
        // The closing sequence must be JSON-escaped inside the config...
        assert!(html.contains(r#""x<\/script><script>alert(1)<\/script>""#));
        // ...so the raw terminator never appears inside a string literal.
        assert!(!html.contains(r#""x</script>"#));
    }
}
