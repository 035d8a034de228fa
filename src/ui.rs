use crate::log_view::LogCard;
use crate::stats::LogStats;

pub fn render_log_page(cards: &[LogCard], stats: &LogStats) -> String {
    LOG_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{TOTAL}}", &stats.total_logs.to_string())
        .replace("{{HOURS}}", &format!("{:.1}", stats.total_hours))
        .replace("{{COMPLETED}}", &stats.completed_tasks.to_string())
        .replace("{{WEEK}}", &format!("{:.1}", stats.this_week_hours))
        .replace("{{PERCENT}}", &stats.progress_percent.to_string())
        .replace("{{CARDS}}", &render_card_list(cards))
}

/// Card markup for the list section, used for the first render and for every
/// filter or search refresh.
pub fn render_card_list(cards: &[LogCard]) -> String {
    if cards.is_empty() {
        return r#"<p class="empty">No activities yet. Add your first one above.</p>"#.to_string();
    }
    cards.iter().map(render_card).collect::<Vec<_>>().join("\n")
}

pub fn render_study_page(user: Option<&str>) -> String {
    STUDY_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{USER}}", &escape(user.unwrap_or("")))
}

fn render_card(card: &LogCard) -> String {
    let project = card
        .project
        .as_deref()
        .map(|p| format!(r#"<h4 class="project">🚀 Project: {}</h4>"#, escape(p)))
        .unwrap_or_default();
    let notes = card
        .notes
        .as_deref()
        .map(|n| format!(r#"<p class="notes">📝 {}</p>"#, escape(n)))
        .unwrap_or_default();
    let modified = card
        .modified_label
        .as_deref()
        .map(|m| format!(" • Edited {m}"))
        .unwrap_or_default();

    format!(
        r#"<article class="card{done}" data-id="{id}">
  <input type="checkbox" class="log-checkbox" data-id="{id}">
  <div class="badges">
    <span>{date}</span><span>{type_icon} {type_label}</span><span>{duration} h</span>
    <span>{priority_icon} {priority_label}</span><span>{status_icon} {status_label}</span>
  </div>
  {project}<h3>{activity}</h3>{notes}
  <p class="meta">🕐 Added {added}{modified}</p>
  <div class="actions">
    <button data-action="toggle" data-id="{id}">Status</button>
    <button data-action="edit" data-id="{id}" data-status="{status}" data-priority="{priority}" data-duration="{duration}" data-notes="{notes_raw}">Edit</button>
    <button data-action="delete" data-id="{id}">Delete</button>
  </div>
</article>"#,
        done = if card.completed { " completed" } else { "" },
        id = card.id,
        date = escape(&card.date_label),
        type_icon = card.type_icon,
        type_label = card.type_label,
        duration = card.duration,
        priority_icon = card.priority_icon,
        priority_label = card.priority_label,
        status_icon = card.status_icon,
        status_label = card.status_label,
        status = card.status.as_str(),
        priority = card.priority.as_str(),
        notes_raw = escape(card.notes.as_deref().unwrap_or("")),
        activity = escape(&card.activity),
        added = escape(&card.added_label),
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const STYLE: &str = r#"
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
    }
    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }
    .app {
      width: min(900px, 100%);
      background: var(--card);
      border-radius: 28px;
      padding: 32px;
      display: grid;
      gap: 22px;
    }
    .panel { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 14px; }
    .stat { background: #fff; border-radius: 16px; padding: 14px; }
    .card { background: #fff; border-radius: 16px; padding: 16px; display: grid; gap: 6px; }
    .card.completed { opacity: 0.7; }
    .badges span { margin-right: 8px; font-size: 0.85rem; }
    .tabs button.active { background: var(--accent); color: #fff; }
    button { border: 0; border-radius: 999px; padding: 8px 14px; background: var(--accent-2); color: #fff; cursor: pointer; }
    .status { min-height: 1.2em; }
    .status[data-type="error"] { color: #c63b2b; }
    .status[data-type="ok"] { color: #2d7a4b; }
    .empty { color: #6f6a65; }
"#;

const LOG_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>InternTrack</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>InternTrack</h1>
      <p><a href="/study">Study planner →</a></p>
    </header>

    <section class="panel">
      <div class="stat">Activities<br><strong id="totalLogs">{{TOTAL}}</strong></div>
      <div class="stat">Hours<br><strong id="totalHours">{{HOURS}}</strong></div>
      <div class="stat">Completed<br><strong id="completedTasks">{{COMPLETED}}</strong></div>
      <div class="stat">This week<br><strong id="thisWeek">{{WEEK}}</strong></div>
      <div class="stat">Progress<br><strong id="progressPercent">{{PERCENT}}%</strong></div>
    </section>

    <form id="log-form">
      <input type="date" name="date" required>
      <select name="type" required>
        <option value="project">Project</option><option value="meeting">Meeting</option>
        <option value="learning">Learning</option><option value="presentation">Presentation</option>
        <option value="other">Other</option>
      </select>
      <select name="priority" required>
        <option value="high">High</option><option value="medium" selected>Medium</option><option value="low">Low</option>
      </select>
      <select name="status" required>
        <option value="pending">Not started</option><option value="in-progress">In progress</option><option value="completed">Completed</option>
      </select>
      <input name="project" placeholder="Project">
      <input name="activity" placeholder="Activity" required>
      <input name="duration" type="number" step="0.25" min="0.25" placeholder="Hours" required>
      <input name="notes" placeholder="Notes">
      <button type="submit">Add activity</button>
    </form>

    <nav class="tabs">
      <button data-filter="all" class="active">All</button>
      <button data-filter="pending">Not started</button>
      <button data-filter="in-progress">In progress</button>
      <button data-filter="completed">Completed</button>
      <button data-filter="high">High priority</button>
      <input id="search" placeholder="Search">
      <button id="bulk-complete">Mark selected complete</button>
      <button id="bulk-delete">Delete selected</button>
    </nav>

    <p id="status" class="status"></p>
    <section id="logList">{{CARDS}}</section>

    <dialog id="edit-dialog">
      <form id="edit-form" method="dialog">
        <input type="hidden" name="id">
        <select name="status">
          <option value="pending">Not started</option><option value="in-progress">In progress</option><option value="completed">Completed</option>
        </select>
        <select name="priority">
          <option value="high">High</option><option value="medium">Medium</option><option value="low">Low</option>
        </select>
        <input name="duration" type="number" step="0.25" min="0.25" required>
        <input name="notes" placeholder="Notes">
        <button type="submit" value="save">Save</button>
        <button type="button" id="edit-cancel">Cancel</button>
      </form>
    </dialog>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const listEl = document.getElementById('logList');
    let filter = 'all';

    const setStatus = (text, type) => {
      statusEl.textContent = text;
      statusEl.dataset.type = type || '';
    };

    const call = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const selectedIds = () =>
      Array.from(document.querySelectorAll('.log-checkbox:checked')).map((cb) => Number(cb.dataset.id));

    const reload = () => window.location.reload();

    const notify = (notice) => {
      setStatus(notice.message, notice.changed ? 'ok' : '');
      if (notice.changed) setTimeout(reload, 600);
    };

    const refreshList = async () => {
      const query = new URLSearchParams({ filter, q: document.getElementById('search').value });
      const res = await fetch(`/api/logs/cards?${query}`);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      listEl.innerHTML = await res.text();
    };

    const editDialog = document.getElementById('edit-dialog');
    const editForm = document.getElementById('edit-form');

    const openEdit = (button) => {
      editForm.elements.id.value = button.dataset.id;
      editForm.elements.status.value = button.dataset.status;
      editForm.elements.priority.value = button.dataset.priority;
      editForm.elements.duration.value = button.dataset.duration;
      editForm.elements.notes.value = button.dataset.notes;
      editDialog.showModal();
    };

    editForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = Object.fromEntries(new FormData(editForm));
      const id = data.id;
      delete data.id;
      data.duration = parseFloat(data.duration);
      try {
        notify(await call('PUT', `/api/logs/${id}`, data));
        editDialog.close();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('edit-cancel').addEventListener('click', () => editDialog.close());

    document.getElementById('log-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const data = Object.fromEntries(new FormData(event.target));
      data.duration = parseFloat(data.duration);
      const result = await call('POST', '/api/logs', data).catch((err) => setStatus(err.message, 'error'));
      if (result && result.added) {
        setStatus(result.message, 'ok');
        setTimeout(reload, 600);
      }
    });

    document.querySelectorAll('[data-filter]').forEach((tab) => {
      tab.addEventListener('click', () => {
        filter = tab.dataset.filter;
        document.querySelectorAll('[data-filter]').forEach((t) => t.classList.toggle('active', t === tab));
        refreshList().catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.getElementById('search').addEventListener('input', () => {
      refreshList().catch((err) => setStatus(err.message, 'error'));
    });

    listEl.addEventListener('click', async (event) => {
      const id = event.target.dataset.id;
      const action = event.target.dataset.action;
      try {
        if (action === 'edit') {
          openEdit(event.target);
        } else if (action === 'toggle') {
          notify(await call('POST', `/api/logs/${id}/toggle`));
        } else if (action === 'delete' && confirm('Delete this activity?')) {
          notify(await call('DELETE', `/api/logs/${id}?confirmed=true`));
        }
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('bulk-delete').addEventListener('click', async () => {
      const ids = selectedIds();
      try {
        const prompt = await call('POST', '/api/logs/bulk-delete', { ids });
        if (confirm(prompt.message)) {
          notify(await call('POST', '/api/logs/bulk-delete', { ids, confirmed: true }));
        }
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('bulk-complete').addEventListener('click', () => {
      call('POST', '/api/logs/bulk-complete', { ids: selectedIds() })
        .then(notify)
        .catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;

const STUDY_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>EduMentor</title>
  <style>{{STYLE}}</style>
</head>
<body>
  <main class="app">
    <header>
      <h1>EduMentor</h1>
      <p><a href="/">← Activity log</a></p>
      <form id="login-form">
        <input name="name" placeholder="Your name" value="{{USER}}" required>
        <button type="submit">Continue</button>
      </form>
    </header>

    <section class="panel">
      <div class="stat">Timer<br><strong id="clock">00:00</strong></div>
      <div class="stat">Studied<br><strong id="studyTime">0</strong> min</div>
      <div class="stat">Streak<br><strong id="streak">0</strong> days</div>
    </section>

    <form id="subject-form">
      <input name="name" placeholder="Subject" required>
      <select name="difficulty">
        <option value="beginner">Beginner</option><option value="intermediate">Intermediate</option><option value="advanced">Advanced</option>
      </select>
      <input name="targetTime" type="number" min="1" value="25">
      <button type="submit">Add subject</button>
    </form>

    <section id="subjects"></section>
    <div>
      <input id="minutes" type="number" min="1" value="25">
      <button id="stop">Stop</button>
      <button id="reset">Reset</button>
    </div>

    <section>
      <h2>Tips</h2>
      <ul id="tips"></ul>
    </section>

    <section>
      <h2>FAQ</h2>
      <div id="faq"></div>
      <p id="faq-answer"></p>
    </section>

    <p id="status" class="status"></p>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const setStatus = (text, type) => {
      statusEl.textContent = text;
      statusEl.dataset.type = type || '';
    };

    const call = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.json();
    };

    const pad = (n) => String(n).padStart(2, '0');

    const showTimer = (timer) => {
      document.getElementById('clock').textContent = `${pad(timer.minutesRemaining)}:${pad(timer.secondsRemaining)}`;
    };

    const render = (view) => {
      document.getElementById('studyTime').textContent = Math.round(view.studyTime);
      document.getElementById('streak').textContent = view.streak;
      const list = document.getElementById('subjects');
      list.innerHTML = '';
      view.subjects.forEach((subject, index) => {
        const row = document.createElement('div');
        row.className = 'card';
        row.textContent = `${subject.name} · ${subject.difficulty} · ${subject.progress}% (milestone ${subject.lastMilestone}%)`;
        const start = document.createElement('button');
        start.textContent = 'Start';
        start.addEventListener('click', () => {
          const minutes = parseFloat(document.getElementById('minutes').value);
          call('POST', '/api/timer/start', { subject: index, minutes }).then(showTimer).catch((err) => setStatus(err.message, 'error'));
        });
        row.appendChild(start);
        list.appendChild(row);
      });
      showTimer(view.timer);
    };

    const refresh = () => call('GET', '/api/study').then(render).catch(() => {});
    const sync = () => call('POST', '/api/timer/sync').then(showTimer).catch(() => {});

    document.getElementById('login-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const name = new FormData(event.target).get('name');
      call('POST', '/api/study/login', { name })
        .then((view) => {
          render(view);
          call('GET', '/api/recommendations').then((tips) => {
            document.getElementById('tips').innerHTML = '';
            tips.forEach((tip) => {
              const li = document.createElement('li');
              li.textContent = tip;
              document.getElementById('tips').appendChild(li);
            });
          });
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('subject-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const data = Object.fromEntries(new FormData(event.target));
      data.targetTime = parseFloat(data.targetTime);
      call('POST', '/api/study/subjects', data)
        .then((notice) => { setStatus(notice.message, 'ok'); refresh(); })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('stop').addEventListener('click', () => {
      call('POST', '/api/timer/stop').then(refresh).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('reset').addEventListener('click', () => {
      call('POST', '/api/timer/reset').then(refresh).catch((err) => setStatus(err.message, 'error'));
    });

    call('GET', '/api/faq').then((questions) => {
      const box = document.getElementById('faq');
      questions.forEach((question) => {
        const btn = document.createElement('button');
        btn.textContent = question;
        btn.addEventListener('click', () => {
          call('POST', '/api/faq/ask', { question }).then((reply) => {
            document.getElementById('faq-answer').textContent = reply.answer;
          });
        });
        box.appendChild(btn);
      });
    });

    document.addEventListener('visibilitychange', () => { if (!document.hidden) sync(); });
    window.addEventListener('focus', sync);
    setInterval(() => call('GET', '/api/timer').then(showTimer).catch(() => {}), 1000);
    refresh();
  </script>
</body>
</html>
"#;
