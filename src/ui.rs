use crate::view::{HabitRow, TableView};
use maud::{html, Markup};

/// Table markup for the `#habit-table` container.
pub fn render_table(view: &TableView) -> String {
    table_markup(view).into_string()
}

pub fn render_index(view: &TableView, year: i32) -> String {
    INDEX_HTML
        .replace("{{YEAR}}", &year.to_string())
        .replace("{{TABLE}}", &render_table(view))
}

fn table_markup(view: &TableView) -> Markup {
    html! {
        table.habits {
            thead {
                tr {
                    @for header in &view.headers {
                        th { (header) }
                    }
                }
            }
            tbody {
                @for row in &view.rows {
                    (row_markup(row))
                }
            }
        }
    }
}

fn row_markup(row: &HabitRow) -> Markup {
    html! {
        tr data-habit-id=(row.id) {
            td.habit-name { (row.name) }
            @for day in &row.days {
                td.day {
                    input.day-toggle type="checkbox"
                        title=(day.label)
                        data-habit-id=(row.id)
                        data-date=(day.date)
                        checked[day.completed];
                }
            }
            td.progress {
                div.progress-bar {
                    div.progress-fill style={ "width: " (row.progress.percent) "%" } {}
                }
                span.progress-text { (row.progress.fraction()) }
            }
            td.actions {
                form method="post" action={ "/habits/" (row.id) "/delete" } {
                    button.delete-btn type="submit" data-habit-id=(row.id) { "Delete" }
                }
            }
        }
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg: #f6f4ef;
      --ink: #2b2a28;
      --accent: #2f7a5b;
      --danger: #c63b2b;
      --card: #ffffff;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      border-radius: 20px;
      box-shadow: 0 18px 40px rgba(0, 0, 0, 0.08);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
    }

    #add-form {
      display: flex;
      gap: 12px;
    }

    #add-form input {
      flex: 1;
      padding: 10px 14px;
      border-radius: 10px;
      border: 1px solid #ccc;
      font-size: 1rem;
    }

    button {
      border: none;
      border-radius: 10px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    .delete-btn {
      background: var(--danger);
    }

    #habit-table {
      overflow-x: auto;
    }

    table.habits {
      width: 100%;
      border-collapse: collapse;
    }

    table.habits th,
    table.habits td {
      padding: 8px;
      text-align: center;
      border-bottom: 1px solid #eee;
      white-space: nowrap;
    }

    table.habits td.habit-name {
      text-align: left;
      font-weight: 600;
    }

    .progress-bar {
      width: 100px;
      height: 8px;
      background: #eee;
      border-radius: 4px;
      overflow: hidden;
      margin: 0 auto 4px;
    }

    .progress-fill {
      height: 100%;
      background: var(--accent);
    }

    .status {
      min-height: 1.2em;
      color: var(--danger);
    }

    footer {
      color: #6f6a65;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Habit Tracker</h1>
    </header>

    <form id="add-form" method="post" action="/habits">
      <input id="habit-name" name="name" type="text" placeholder="New habit" autocomplete="off" />
      <button type="submit">Add</button>
    </form>

    <div class="status" id="status"></div>

    <section id="habit-table">{{TABLE}}</section>

    <footer>&copy; <span id="year">{{YEAR}}</span> Habit Tracker</footer>
  </main>

  <script>
    const tableEl = document.getElementById('habit-table');
    const nameEl = document.getElementById('habit-name');
    const statusEl = document.getElementById('status');

    const setStatus = (message) => {
      statusEl.textContent = message;
    };

    const replaceTable = (data) => {
      tableEl.innerHTML = data.table_html;
      bindTable();
    };

    const refresh = async () => {
      const res = await fetch('/api/view');
      if (res.ok) {
        replaceTable(await res.json());
      }
    };

    const send = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body)
      });

      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }

      const data = await res.json();
      replaceTable(data);
      setStatus('');
      return data;
    };

    // A failed save leaves the server state unchanged; redraw it and keep the error visible.
    const fail = (err) => {
      setStatus(err.message);
      refresh().catch(() => {});
    };

    const bindTable = () => {
      tableEl.querySelectorAll('.day-toggle').forEach((toggle) => {
        toggle.addEventListener('change', () => {
          const id = toggle.dataset.habitId;
          send('POST', `/api/habits/${id}/toggle`, {
            date: toggle.dataset.date,
            completed: toggle.checked
          }).catch(fail);
        });
      });

      tableEl.querySelectorAll('.delete-btn').forEach((button) => {
        button.addEventListener('click', (event) => {
          event.preventDefault();
          send('DELETE', `/api/habits/${button.dataset.habitId}`).catch(fail);
        });
      });
    };

    document.getElementById('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      send('POST', '/api/habits', { name: nameEl.value })
        .then(() => {
          nameEl.value = '';
        })
        .catch(fail);
    });

    bindTable();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::last_n_days_at;
    use crate::models::Habit;
    use crate::view::build_view;
    use chrono::NaiveDate;

    fn view_for(habits: &[Habit]) -> TableView {
        let window = last_n_days_at(NaiveDate::from_ymd_opt(2024, 7, 7).unwrap(), 7);
        build_view(habits, &window)
    }

    #[test]
    fn table_has_one_toggle_per_day_and_one_delete_per_habit() {
        let mut reading = Habit::new(10, "Reading");
        reading.history.insert("2024-07-01".to_string(), true);
        let html = render_table(&view_for(&[reading, Habit::new(11, "Walk")]));

        assert_eq!(html.matches("class=\"day-toggle\"").count(), 14);
        assert_eq!(html.matches("class=\"delete-btn\"").count(), 2);
        assert_eq!(html.matches("checked").count(), 1);
        assert!(html.contains("data-date=\"2024-07-01\" checked"));
        assert!(html.contains("1/7"));
        assert!(html.contains("width: 14%"));
        assert!(html.contains("<th>Mon Jul 1</th>"));
    }

    #[test]
    fn names_are_escaped() {
        let html = render_table(&view_for(&[Habit::new(1, "<b>Gym</b> & run")]));
        assert!(html.contains("&lt;b&gt;Gym&lt;/b&gt; &amp; run"));
        assert!(!html.contains("<b>Gym"));
    }

    #[test]
    fn render_is_idempotent() {
        let habits = vec![Habit::new(1, "Read"), Habit::new(2, "Walk")];
        let view = view_for(&habits);
        assert_eq!(render_table(&view), render_table(&view));
        assert_eq!(render_index(&view, 2024), render_index(&view, 2024));
    }

    #[test]
    fn page_script_keeps_error_status_when_redrawing() {
        let page = render_index(&view_for(&[]), 2024);
        let refresh = &page[page.find("const refresh").unwrap()..page.find("const send").unwrap()];
        assert!(refresh.contains("replaceTable"));
        assert!(!refresh.contains("setStatus"));
        assert!(page.contains(".catch(fail)"));
        assert!(!page.contains("send('GET'"));
    }

    #[test]
    fn index_embeds_table_and_year() {
        let view = view_for(&[Habit::new(1, "Read")]);
        let page = render_index(&view, 2031);
        assert!(page.contains(&render_table(&view)));
        assert!(page.contains("<span id=\"year\">2031</span>"));
        assert!(!page.contains("{{"));
    }
}
