//! Static online help.

use ratatui::text::Line;

use crate::mode::clamp_offset;

pub const HELP_TEXT: &str = "\
hatop is an interactive client for the HAProxy stats/admin unix socket.

It polls `show info` and `show stat` in the configured interval and shows
the result in several modes. The CLI mode forwards commands to the socket.

Key        Mode     Description

1          STATUS   health, session and queue statistics (default)
2          TRAFFIC  connection and request rates, traffic counters
3          HTTP     HTTP request rates and response codes
4          ERRORS   health info, error counters and downtime
5          CLI      embedded command line for the unix socket
H h ?      HELP     this help screen
TAB        -        next mode (SHIFT-TAB previous mode)
` or ESC   -        back to the previous mode
SPACE      -        refresh now
Q q        -        quit (CTRL-C quits from any mode)

Navigation:

UP/DOWN    select service         PGUP/PGDN  scroll one page
HOME/END   first/last service     ENTER      copy selection to the CLI

Administrative hotkeys (act on the selected service, logged in the CLI):

F4         restore initial weight
F5 / F6    decrease weight by 10 / 1
F7 / F8    increase weight by 1 / 10
F9 / F10   enable / disable server

CLI keys:

ENTER      submit          UP/DOWN        history
LEFT/RIGHT move cursor     HOME/END       start/end of line
BACKSPACE  delete left     DELETE         delete right
PGUP/PGDN  scroll output   SHIFT-LEFT/RIGHT  scroll output sideways

Header reference:

Node       configured name of the haproxy node
Uptime     runtime since haproxy was initially started
Pipes      pipes currently used for kernel-based tcp slicing
Procs      number of haproxy processes
Tasks      number of active process tasks
Queue      number of queued process tasks (run queue)
Proxies    number of configured proxies
Services   number of configured services

Columns:

NAME       name of the proxy and its services
W          configured weight of the service
STATUS     service status (UP/DOWN/NOLB/MAINT/MAINT(via)...)
CHECK      status of last health check
ACT BCK    active / backup server (or number of them for a backend)
QCUR QMAX  current / max queued requests
SCUR SMAX  current / max sessions
SLIM STOT  sessions limit / total sessions
LBTOT      total number of times a server was selected
RATE RLIM  sessions per second / limit on new sessions per second
RMAX       max number of new sessions per second
BIN BOUT   bytes in / out (IEEE 1541-2002)
BIN/s      bytes in / out per second since the last refresh
1xx..5xx   HTTP responses by status class, ?xx other codes
RTOT       total number of HTTP requests received
CF CD CL   failed checks, UP->DOWN transitions, last status change
ECONN      connection errors
EREQ ERSP  request / response errors
DREQ DRSP  denied requests / responses
DOWN       total downtime

Health check status reference:

UNK        unknown
INI        initializing
SOCKERR    socket error
L4OK       check passed on layer 4, no upper layers testing enabled
L4TMOUT    layer 1-4 timeout
L4CON      layer 1-4 connection problem
L6OK       check passed on layer 6
L6TOUT     layer 6 (SSL) timeout
L6RSP      layer 6 invalid response - protocol error
L7OK       check passed on layer 7
L7OKC      check conditionally passed on layer 7
L7TOUT     layer 7 (HTTP/SMTP) timeout
L7RSP      layer 7 invalid response - protocol error
L7STS      layer 7 response error, for example HTTP 5xx
";

pub fn help_line_count() -> usize {
    HELP_TEXT.lines().count()
}

pub fn render_help(scroll: usize, height: usize) -> Vec<Line<'static>> {
    let offset = clamp_offset(scroll, help_line_count(), height);
    HELP_TEXT
        .lines()
        .skip(offset)
        .take(height)
        .map(|l| Line::from(format!(" {l}")))
        .collect()
}
