//! Provides tools and interfaces to integrate the crate's functionality with Python.

use std::sync::Arc;

use bincode::{config, Decode, Encode};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::automaton::{Dfa, Nfa, StateId};
use crate::determinize::{determinize, nfa_to_dfa};
use crate::epsilon::remove_epsilon;
use crate::io_transitions::{read_transitions, write_transitions, ReadOptions};
use crate::simulate::Acceptor;

#[pyclass(name = "Nfa", module = "finite_automata.finite_automata_rs")]
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct PyNfa(Arc<Nfa>);

#[pyclass(name = "Dfa", module = "finite_automata.finite_automata_rs")]
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct PyDfa(Arc<Dfa>);

fn read_options(skip_malformed: bool) -> ReadOptions {
    if skip_malformed {
        ReadOptions::skip_malformed()
    } else {
        ReadOptions::default()
    }
}

fn to_text<T: crate::automaton::Targets>(
    automaton: &crate::automaton::Automaton<T>,
) -> PyResult<String> {
    let mut buffer: Vec<u8> = Vec::new();
    write_transitions(&mut buffer, automaton)?;
    String::from_utf8(buffer).map_err(|e| PyErr::new::<PyValueError, _>(e.to_string()))
}

#[pymethods]
impl PyNfa {
    /// Parses an NFA from transition-list text.
    #[new]
    #[pyo3(signature = (transitions, skip_malformed = false))]
    fn __new__(py: Python<'_>, transitions: &str, skip_malformed: bool) -> PyResult<Self> {
        py.allow_threads(|| {
            read_transitions(transitions.as_bytes(), &read_options(skip_malformed))
                .map(|x| PyNfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    fn accepts(&self, input: &str) -> PyResult<bool> {
        Ok(self.0.accepts(input)?)
    }

    fn accepts_all(&self, py: Python<'_>, inputs: Vec<String>) -> PyResult<Vec<bool>> {
        py.allow_threads(|| self.0.accepts_all(inputs.as_slice()).map_err(Into::into))
    }

    fn remove_epsilon(&self, py: Python<'_>) -> PyNfa {
        py.allow_threads(|| PyNfa(Arc::new(remove_epsilon(&self.0))))
    }

    fn determinize(&self, py: Python<'_>) -> PyResult<PyDfa> {
        py.allow_threads(|| {
            determinize(&self.0)
                .map(|x| PyDfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    fn to_dfa(&self, py: Python<'_>) -> PyResult<PyDfa> {
        py.allow_threads(|| {
            nfa_to_dfa(&self.0)
                .map(|x| PyDfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    fn get_initial_state(&self) -> PyResult<StateId> {
        Ok(self.0.initial_state()?)
    }

    fn is_final_state(&self, state: StateId) -> PyResult<bool> {
        Ok(self.0.is_final(state)?)
    }

    fn get_state_count(&self) -> u32 {
        self.0.state_count()
    }

    fn has_epsilon_transitions(&self) -> bool {
        self.0.has_epsilon_transitions()
    }

    fn to_transitions(&self) -> PyResult<String> {
        to_text(&*self.0)
    }

    fn to_graphviz(&self) -> String {
        self.0.to_graphviz()
    }

    fn __repr__(&self) -> String {
        format!("{:#?}", self.0)
    }

    fn __str__(&self) -> String {
        format!("{}", self.0)
    }

    fn __eq__(&self, other: &PyNfa) -> bool {
        *self.0 == *other.0
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> Self {
        PyNfa(Arc::new((*self.0).clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls = PyModule::import(py, "finite_automata.finite_automata_rs")?.getattr("Nfa")?;
            let binary_data: Vec<u8> = bincode::encode_to_vec(&self.0, config::standard())
                .map_err(|e| {
                    PyErr::new::<PyValueError, _>(format!("Serialization of Nfa failed: {}", e))
                })?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        Ok(PyNfa(Arc::new(Nfa::from_binary(&binary_data)?)))
    }
}

#[pymethods]
impl PyDfa {
    /// Parses a DFA from transition-list text.
    #[new]
    #[pyo3(signature = (transitions, skip_malformed = false))]
    fn __new__(py: Python<'_>, transitions: &str, skip_malformed: bool) -> PyResult<Self> {
        py.allow_threads(|| {
            read_transitions(transitions.as_bytes(), &read_options(skip_malformed))
                .map(|x| PyDfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    #[staticmethod]
    fn from_regex(py: Python<'_>, regex: &str) -> PyResult<Self> {
        py.allow_threads(|| {
            Dfa::from_regex(regex)
                .map(|x| PyDfa(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    fn accepts(&self, input: &str) -> PyResult<bool> {
        Ok(self.0.accepts(input)?)
    }

    fn accepts_all(&self, py: Python<'_>, inputs: Vec<String>) -> PyResult<Vec<bool>> {
        py.allow_threads(|| self.0.accepts_all(inputs.as_slice()).map_err(Into::into))
    }

    fn get_next_state(&self, state: StateId, input: char) -> PyResult<Option<StateId>> {
        Ok(self.0.next_state(state, input)?)
    }

    fn get_state_sequence(&self, input: &str) -> PyResult<Option<Vec<StateId>>> {
        Ok(self.0.state_sequence(input)?)
    }

    fn get_initial_state(&self) -> PyResult<StateId> {
        Ok(self.0.initial_state()?)
    }

    fn is_final_state(&self, state: StateId) -> PyResult<bool> {
        Ok(self.0.is_final(state)?)
    }

    fn get_state_count(&self) -> u32 {
        self.0.state_count()
    }

    fn to_nfa(&self) -> PyNfa {
        PyNfa(Arc::new(Nfa::from(&*self.0)))
    }

    fn to_transitions(&self) -> PyResult<String> {
        to_text(&*self.0)
    }

    fn to_graphviz(&self) -> String {
        self.0.to_graphviz()
    }

    fn __repr__(&self) -> String {
        format!("{:#?}", self.0)
    }

    fn __str__(&self) -> String {
        format!("{}", self.0)
    }

    fn __eq__(&self, other: &PyDfa) -> bool {
        *self.0 == *other.0
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> Self {
        PyDfa(Arc::new((*self.0).clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls = PyModule::import(py, "finite_automata.finite_automata_rs")?.getattr("Dfa")?;
            let binary_data: Vec<u8> = bincode::encode_to_vec(&self.0, config::standard())
                .map_err(|e| {
                    PyErr::new::<PyValueError, _>(format!("Serialization of Dfa failed: {}", e))
                })?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        Ok(PyDfa(Arc::new(Dfa::from_binary(&binary_data)?)))
    }
}

#[pymodule]
fn finite_automata_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNfa>()?;
    m.add_class::<PyDfa>()?;

    Ok(())
}
